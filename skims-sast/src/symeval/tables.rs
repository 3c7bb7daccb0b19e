//! Lookup tables consulted by the evaluator.
//!
//! Method entries are dotted call paths; every entry also matches through
//! its dotted suffixes of two or more segments, so a call written against
//! an imported simple name (`Random.nextInt`) hits the qualified entry
//! (`java.util.Random.nextInt`). Type keys match through all suffixes.

use std::sync::LazyLock;

use skims_core::types::collections::{FxHashMap, FxHashSet};

use crate::queries::finding::Finding;

/// A set of dotted method paths, expanded to their suffixes.
#[derive(Debug, Default)]
pub struct MethodSet(FxHashSet<String>);

impl MethodSet {
    fn from_entries(entries: &[&str]) -> Self {
        let mut set = FxHashSet::default();
        for entry in entries {
            set.insert((*entry).to_string());
            let segments: Vec<&str> = entry.split('.').collect();
            for start in 1..segments.len().saturating_sub(1) {
                set.insert(segments[start..].join("."));
            }
        }
        Self(set)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.0.contains(method)
    }
}

/// Type name -> method paths, with type keys expanded to every suffix.
#[derive(Debug, Default)]
pub struct TypeTable(FxHashMap<String, FxHashSet<&'static str>>);

impl TypeTable {
    fn from_entries(entries: &[(&str, &[&'static str])]) -> Self {
        let mut table: FxHashMap<String, FxHashSet<&'static str>> = FxHashMap::default();
        for (type_name, methods) in entries {
            let segments: Vec<&str> = type_name.split('.').collect();
            for start in 0..segments.len() {
                table
                    .entry(segments[start..].join("."))
                    .or_default()
                    .extend(methods.iter().copied());
            }
        }
        Self(table)
    }

    pub fn contains(&self, type_name: &str, method_path: &str) -> bool {
        self.0
            .get(type_name)
            .is_some_and(|methods| methods.contains(method_path))
    }
}

/// Type name -> method path -> argument values that make the receiver
/// dangerous. Values compare case-insensitively.
#[derive(Debug, Default)]
pub struct ValueTable(FxHashMap<String, FxHashMap<&'static str, &'static [&'static str]>>);

impl ValueTable {
    fn from_entries(entries: &[(&str, &'static str, &'static [&'static str])]) -> Self {
        let mut table: FxHashMap<String, FxHashMap<&'static str, &'static [&'static str]>> =
            FxHashMap::default();
        for (type_name, method, values) in entries {
            let segments: Vec<&str> = type_name.split('.').collect();
            for start in 0..segments.len() {
                table
                    .entry(segments[start..].join("."))
                    .or_default()
                    .insert(method, values);
            }
        }
        Self(table)
    }

    pub fn values(&self, type_name: &str, method_path: &str) -> Option<&'static [&'static str]> {
        self.0.get(type_name)?.get(method_path).copied()
    }
}

fn per_finding<T>(entries: Vec<(Finding, T)>) -> FxHashMap<Finding, T> {
    entries.into_iter().collect()
}

/// Calls whose result is dangerous wherever they appear.
static STATIC_FINDING: LazyLock<FxHashMap<Finding, MethodSet>> = LazyLock::new(|| {
    per_finding(vec![
        (
            Finding::F034,
            MethodSet::from_entries(&[
                "java.lang.Math.random",
                "java.util.Random.nextFloat",
                "java.util.Random.nextInt",
                "java.util.Random.nextLong",
                "java.util.Random.nextBoolean",
                "java.util.Random.nextDouble",
                "java.util.Random.nextGaussian",
                "Math.random",
            ]),
        ),
        (Finding::F001, MethodSet::from_entries(&["System.Console.ReadLine"])),
        (
            Finding::F004,
            MethodSet::from_entries(&["Environment.GetEnvironmentVariable"]),
        ),
        (
            Finding::F063,
            MethodSet::from_entries(&["Environment.GetEnvironmentVariable"]),
        ),
    ])
});

/// Calls that make their arguments dangerous.
static STATIC_SIDE_EFFECTS: LazyLock<FxHashMap<Finding, MethodSet>> = LazyLock::new(|| {
    per_finding(vec![(
        Finding::F034,
        MethodSet::from_entries(&["java.util.Random.nextBytes"]),
    )])
});

/// Receiver-independent paths that pass argument danger through.
static BY_OBJ_NO_TYPE_ARGS_PROPAG: LazyLock<FxHashMap<Finding, MethodSet>> =
    LazyLock::new(|| {
        per_finding(vec![(
            Finding::F034,
            MethodSet::from_entries(&[
                "getSession.setAttribute",
                "toString.substring",
                "addCookie",
                "toString",
            ]),
        )])
    });

/// Calls that pass argument danger to their result.
static BY_ARGS_PROPAGATION: LazyLock<MethodSet> = LazyLock::new(|| {
    MethodSet::from_entries(&[
        "java.net.URLDecoder.decode",
        "java.nio.file.Files.newInputStream",
        "java.nio.file.Paths.get",
        "org.apache.commons.codec.binary.Base64.decodeBase64",
        "org.apache.commons.codec.binary.Base64.encodeBase64",
        "org.springframework.jdbc.core.JdbcTemplate.batchUpdate",
        "org.springframework.jdbc.core.JdbcTemplate.execute",
        "org.springframework.jdbc.core.JdbcTemplate.query",
        "org.springframework.jdbc.core.JdbcTemplate.queryForInt",
        "org.springframework.jdbc.core.JdbcTemplate.queryForList",
        "org.springframework.jdbc.core.JdbcTemplate.queryForLong",
        "org.springframework.jdbc.core.JdbcTemplate.queryForMap",
        "org.springframework.jdbc.core.JdbcTemplate.queryForObject",
        "org.springframework.jdbc.core.JdbcTemplate.queryForRowSet",
        "org.owasp.esapi.ESAPI.encoder.encodeForBase64",
        "org.owasp.esapi.ESAPI.encoder.decodeForBase64",
        "Double.toString",
        "Float.toString",
        "Integer.toString",
        "Long.toString",
        "String.valueOf",
        "String.format",
        "System.Diagnostics.Process.Start",
        "System.IO.File.Copy",
        "System.IO.File.Create",
        "System.IO.File.Delete",
        "System.IO.File.Exists",
        "System.IO.File.Move",
        "System.IO.File.Open",
        "System.IO.File.Replace",
        "System.IO.Path.Combine",
        "System.Xml.XPath.XPathExpression.Compile",
        "Encoding.UTF8.GetBytes",
        "child_process.exec",
        "child_process.execSync",
        "decodeURI",
        "encodeURIComponent",
        "Object.values",
        "fs.readFile",
        "fs.readFileSync",
        "fs.unlink",
        "fs.unlinkSync",
        "fs.writeFile",
        "fs.writeFileSync",
        "fs.readdir",
        "fs.readdirSync",
        "fs.rmdir",
        "fs.rmdirSync",
        "fs.stat",
        "fs.statSync",
        "fs.appendFile",
        "fs.appendFileSync",
        "fs.copyFile",
        "fs.copyFileSync",
        "fs.createReadStream",
        "fs.createWriteStream",
        "fs.exists",
        "fs.existsSync",
        "path.join",
        "path.resolve",
    ])
});

/// Methods whose result is dangerous when the receiver is.
static BY_OBJ: LazyLock<TypeTable> = LazyLock::new(|| {
    TypeTable::from_entries(&[
        ("java.lang.String", &["getBytes", "split", "substring", "toCharArray", "trim", "toLowerCase", "toUpperCase", "concat", "replace"]),
        ("string", &["Split", "Replace", "concat", "Trim", "ToLower", "ToUpper"]),
        ("java.lang.StringBuilder", &["append", "append.toString", "toString"]),
        ("java.sql.CallableStatement", &["executeQuery"]),
        ("java.sql.PreparedStatement", &["execute"]),
        (
            "org.springframework.jdbc.core.JdbcTemplate",
            &["query", "queryForList", "queryForMap", "queryForObject", "queryForRowSet", "queryForStream"],
        ),
        ("java.util.Enumeration", &["nextElement"]),
        ("java.util.Map", &["get"]),
        ("java.util.List", &["get"]),
        (
            "System.Data.SqlClient.SqlCommand",
            &[
                "ExecuteNonQuery",
                "ExecuteReader",
                "ExecuteScalar",
                "ExecuteNonQueryAsync",
                "ExecuteScalarAsync",
                "ExecuteReaderAsync",
            ],
        ),
        ("System.IO.StreamReader", &["ReadLine", "ReadToEnd"]),
        ("System.Diagnostics.Process", &["Start"]),
    ])
});

/// Methods that are dangerous when an argument is.
static BY_OBJ_ARGS: LazyLock<TypeTable> = LazyLock::new(|| {
    TypeTable::from_entries(&[
        ("java.sql.Connection", &["prepareCall", "prepareStatement"]),
        (
            "java.sql.Statement",
            &[
                "addBatch",
                "execute",
                "executeBatch",
                "executeLargeBatch",
                "executeLargeUpdate",
                "executeQuery",
                "executeUpdate",
            ],
        ),
        ("javax.xml.xpath.XPath", &["evaluate", "compile"]),
        ("child_process", &["exec", "execSync"]),
        ("string", &["concat"]),
        (
            "fs",
            &[
                "readFile",
                "readFileSync",
                "unlink",
                "unlinkSync",
                "writeFile",
                "writeFileSync",
                "createReadStream",
                "createWriteStream",
            ],
        ),
        ("path", &["join"]),
    ])
});

/// Methods that return user-controlled data.
static BY_TYPE: LazyLock<TypeTable> = LazyLock::new(|| {
    TypeTable::from_entries(&[
        ("javax.servlet.http.Cookie", &["getName", "getValue"]),
        (
            "javax.servlet.http.HttpServletRequest",
            &[
                "getHeader",
                "getHeaderNames",
                "getHeaders",
                "getParameter",
                "getParameterMap",
                "getParameterNames",
                "getParameterValues",
                "getQueryString",
            ],
        ),
        ("System.Web.HttpRequest", &["Params.Get"]),
        ("System.Net.Sockets.TcpClient", &["GetStream"]),
        ("System.Net.Sockets.TcpListener", &["AcceptTcpClient"]),
        ("System.Data.SqlClient.SqlDataReader", &["GetString"]),
    ])
});

/// Calls whose argument values alone make the receiver dangerous.
static BY_TYPE_AND_VALUE_FINDING: LazyLock<FxHashMap<Finding, ValueTable>> =
    LazyLock::new(|| {
        per_finding(vec![
            (
                Finding::F008,
                ValueTable::from_entries(&[(
                    "javax.servlet.http.HttpServletResponse",
                    "setHeader",
                    &["X-XSS-Protection", "0"],
                )]),
            ),
            (
                Finding::F042,
                ValueTable::from_entries(&[("javax.servlet.http.Cookie", "setSecure", &["false"])]),
            ),
        ])
    });

/// Calls through which dangerous arguments taint the receiver.
static BY_TYPE_ARGS_PROPAGATION: LazyLock<TypeTable> = LazyLock::new(|| {
    TypeTable::from_entries(&[
        ("java.io.PrintWriter", &["format"]),
        ("java.util.List", &["add"]),
        ("java.lang.StringBuilder", &["append"]),
    ])
});

/// Per-finding sinks reached with dangerous arguments.
static BY_TYPE_ARGS_PROPAG_FINDING: LazyLock<FxHashMap<Finding, TypeTable>> =
    LazyLock::new(|| {
        per_finding(vec![
            (
                Finding::F042,
                TypeTable::from_entries(&[("javax.servlet.http.HttpServletResponse", &["addCookie"])]),
            ),
            (
                Finding::F034,
                TypeTable::from_entries(&[
                    ("javax.servlet.http.HttpServletResponse", &["addCookie"]),
                    ("javax.servlet.http.HttpServletRequest", &["getSession.setAttribute"]),
                    ("Response", &["cookie"]),
                ]),
            ),
            (
                Finding::F004,
                TypeTable::from_entries(&[("ProcessBuilder", &["command"]), ("Runtime", &["exec", "getRuntime.exec"])]),
            ),
            (
                Finding::F008,
                TypeTable::from_entries(&[
                    (
                        "javax.servlet.http.HttpServletResponse",
                        &[
                            "getWriter.format",
                            "getWriter.print",
                            "getWriter.printf",
                            "getWriter.println",
                            "getWriter.write",
                        ],
                    ),
                    ("java.io.PrintWriter", &["format", "print", "printf", "println", "write"]),
                    ("System.Web.HttpResponse", &["Write", "AddHeader"]),
                    ("Response", &["send"]),
                ]),
            ),
        ])
    });

static EMPTY_METHODS: LazyLock<MethodSet> = LazyLock::new(MethodSet::default);
static EMPTY_TYPES: LazyLock<TypeTable> = LazyLock::new(TypeTable::default);
static EMPTY_VALUES: LazyLock<ValueTable> = LazyLock::new(ValueTable::default);

pub fn static_finding(finding: Finding) -> &'static MethodSet {
    STATIC_FINDING.get(&finding).unwrap_or(&EMPTY_METHODS)
}

pub fn static_side_effects(finding: Finding) -> &'static MethodSet {
    STATIC_SIDE_EFFECTS.get(&finding).unwrap_or(&EMPTY_METHODS)
}

pub fn by_obj_no_type_args_propagation(finding: Finding) -> &'static MethodSet {
    BY_OBJ_NO_TYPE_ARGS_PROPAG
        .get(&finding)
        .unwrap_or(&EMPTY_METHODS)
}

pub fn by_args_propagation() -> &'static MethodSet {
    &BY_ARGS_PROPAGATION
}

pub fn by_obj() -> &'static TypeTable {
    &BY_OBJ
}

pub fn by_obj_args() -> &'static TypeTable {
    &BY_OBJ_ARGS
}

pub fn by_type() -> &'static TypeTable {
    &BY_TYPE
}

pub fn by_type_and_value(finding: Finding) -> &'static ValueTable {
    BY_TYPE_AND_VALUE_FINDING
        .get(&finding)
        .unwrap_or(&EMPTY_VALUES)
}

pub fn by_type_args_propagation() -> &'static TypeTable {
    &BY_TYPE_ARGS_PROPAGATION
}

pub fn by_type_args_propagation_finding(finding: Finding) -> &'static TypeTable {
    BY_TYPE_ARGS_PROPAG_FINDING
        .get(&finding)
        .unwrap_or(&EMPTY_TYPES)
}

/// How an instantiated type relates to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instantiation {
    /// Dangerous with no arguments at all.
    Always,
    /// Dangerous only when an argument is.
    WithDangerousArgs,
    /// Never dangerous, whatever the arguments.
    Sanitizer,
}

static INSTANTIATIONS: LazyLock<FxHashMap<Finding, Vec<(&'static str, Instantiation)>>> =
    LazyLock::new(|| {
        per_finding(vec![
            (
                Finding::F004,
                vec![
                    ("java.lang.ProcessBuilder", Instantiation::WithDangerousArgs),
                    ("System.Diagnostics.ProcessStartInfo", Instantiation::WithDangerousArgs),
                ],
            ),
            (
                Finding::F063,
                vec![
                    ("java.io.File", Instantiation::WithDangerousArgs),
                    ("java.io.FileInputStream", Instantiation::WithDangerousArgs),
                    ("java.io.FileOutputStream", Instantiation::WithDangerousArgs),
                    ("java.io.FileReader", Instantiation::WithDangerousArgs),
                    ("java.io.FileWriter", Instantiation::WithDangerousArgs),
                    ("java.io.RandomAccessFile", Instantiation::WithDangerousArgs),
                    ("System.IO.FileStream", Instantiation::WithDangerousArgs),
                    ("System.IO.StreamReader", Instantiation::WithDangerousArgs),
                ],
            ),
            (
                Finding::F034,
                vec![
                    ("java.util.Random", Instantiation::Always),
                    ("java.security.SecureRandom", Instantiation::Sanitizer),
                    ("System.Random", Instantiation::Always),
                ],
            ),
        ])
    });

/// The rule for instantiating `object_type` under `finding`, matching the
/// written type against qualified names by dotted suffix.
pub fn instantiation(finding: Finding, object_type: &str) -> Option<Instantiation> {
    INSTANTIATIONS.get(&finding)?.iter().find_map(|(qualified, rule)| {
        crate::metadata::types::is_dotted_suffix(qualified, object_type).then_some(*rule)
    })
}

/// Whether any finding-keyed table carries rules for `finding`. Injection
/// findings also use the shared source tables.
pub fn has_rules(finding: Finding) -> bool {
    finding.is_injection()
        || STATIC_FINDING.contains_key(&finding)
        || BY_TYPE_ARGS_PROPAG_FINDING.contains_key(&finding)
        || BY_TYPE_AND_VALUE_FINDING.contains_key(&finding)
        || INSTANTIATIONS.contains_key(&finding)
}

/// Declared parameter types that carry request data.
const TAINTED_TYPES: [&str; 5] = [
    "javax.servlet.http.HttpServletRequest",
    "javax.servlet.ServletRequest",
    "System.Web.HttpRequest",
    "Microsoft.AspNetCore.Http.HttpRequest",
    "IFormCollection",
];

/// Parameter annotations (Spring) and attributes (ASP.NET) that bind
/// request data.
const TAINTED_ANNOTATIONS: [&str; 10] = [
    "RequestParam",
    "PathVariable",
    "RequestBody",
    "RequestHeader",
    "CookieValue",
    "FromQuery",
    "FromBody",
    "FromForm",
    "FromRoute",
    "FromHeader",
];

pub fn is_tainted_type(type_base: &str) -> bool {
    TAINTED_TYPES
        .iter()
        .any(|t| crate::metadata::types::is_dotted_suffix(t, type_base))
}

pub fn is_tainted_annotation(annotation: &str) -> bool {
    let name = annotation.trim_start_matches('@');
    let name = name.split('(').next().unwrap_or(name);
    let name = name.rsplit('.').next().unwrap_or(name);
    TAINTED_ANNOTATIONS.contains(&name)
}

/// Weak digest names `MessageDigest.getInstance` must not receive.
pub const WEAK_DIGESTS: [&str; 4] = ["md2", "md5", "sha1", "sha-1"];

/// Weak cipher transformations for `Cipher.getInstance`, matched on the
/// algorithm or mode part.
pub const WEAK_CIPHERS: [&str; 6] = ["des", "desede", "rc2", "rc4", "blowfish", "ecb"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_sets_match_multi_segment_suffixes() {
        let set = MethodSet::from_entries(&["java.util.Random.nextInt"]);
        assert!(set.contains("java.util.Random.nextInt"));
        assert!(set.contains("Random.nextInt"));
        assert!(!set.contains("nextInt"));
    }

    #[test]
    fn type_tables_match_every_type_suffix() {
        assert!(by_type().contains("HttpServletRequest", "getParameter"));
        assert!(by_type().contains("javax.servlet.http.HttpServletRequest", "getParameter"));
        assert!(!by_type().contains("HttpServletRequest", "getSession"));
    }

    #[test]
    fn instantiation_rules_by_finding() {
        assert_eq!(
            instantiation(Finding::F034, "Random"),
            Some(Instantiation::Always)
        );
        assert_eq!(
            instantiation(Finding::F034, "SecureRandom"),
            Some(Instantiation::Sanitizer)
        );
        assert_eq!(
            instantiation(Finding::F004, "ProcessBuilder"),
            Some(Instantiation::WithDangerousArgs)
        );
        assert_eq!(instantiation(Finding::F001, "ProcessBuilder"), None);
    }

    #[test]
    fn tainted_sources() {
        assert!(is_tainted_type("HttpServletRequest"));
        assert!(!is_tainted_type("HttpServletResponse"));
        assert!(is_tainted_annotation("@RequestParam"));
        assert!(is_tainted_annotation("RequestParam(\"id\")"));
        assert!(!is_tainted_annotation("Override"));
    }
}
