//! Python.

crate::grammar_adapter!(PythonParser => Python);
