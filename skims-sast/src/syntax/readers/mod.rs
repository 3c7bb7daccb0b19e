//! Syntax readers: one function per construct, tried in order.
//!
//! Language dispatchers claim label types their grammar spells in its own
//! way; everything else goes to the common readers, which work on the
//! language-neutral `NodeKind`. A reader that does not recognize the shape
//! in front of it returns `MissingCaseHandling` and the next one is tried.

pub mod common;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod kotlin;
pub mod python;

use skims_core::errors::EvaluationError;

use super::lowering::Lowerer;
use crate::graph::NodeId;
use crate::scanner::language_detect::Language;

/// Reads one node, returning the index of the step holding its result.
pub type Reader = fn(&mut Lowerer<'_>, NodeId) -> Result<usize, EvaluationError>;

/// Readers claiming a set of label types.
pub struct Dispatcher {
    pub label_types: &'static [&'static str],
    pub readers: &'static [Reader],
}

fn dispatchers(language: Language) -> &'static [Dispatcher] {
    match language {
        Language::Java => java::DISPATCHERS,
        Language::CSharp => csharp::DISPATCHERS,
        Language::JavaScript | Language::TypeScript => javascript::DISPATCHERS,
        Language::Go => go::DISPATCHERS,
        Language::Kotlin => kotlin::DISPATCHERS,
        Language::Python => python::DISPATCHERS,
        Language::Yaml | Language::Json | Language::Swift | Language::Hcl => &[],
    }
}

/// Read `n_id` with the first reader that handles it.
pub fn read(lowerer: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lowerer.graph();
    let label_type = graph.label_type(n_id);
    let readers = dispatchers(graph.language())
        .iter()
        .filter(|d| d.label_types.contains(&label_type))
        .flat_map(|d| d.readers.iter().copied())
        .chain(std::iter::once(common::read as Reader));

    for reader in readers {
        let mark = lowerer.mark();
        match reader(lowerer, n_id) {
            Ok(index) => return Ok(index),
            Err(EvaluationError::MissingCaseHandling { .. }) => lowerer.rollback(mark),
            Err(e) => {
                lowerer.rollback(mark);
                return Err(e);
            }
        }
    }
    Err(EvaluationError::MissingSyntaxReader {
        label_type: label_type.to_string(),
        n_id: n_id.0,
    })
}

pub(crate) fn missing(reader: &'static str, n_id: NodeId) -> EvaluationError {
    EvaluationError::MissingCaseHandling {
        reader,
        n_id: n_id.0,
    }
}
