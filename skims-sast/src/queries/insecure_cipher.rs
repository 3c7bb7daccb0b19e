//! Weak ciphers, digests and password encoders (F052).

use super::method::Method;
use super::{Query, QueryContext};
use crate::db::GraphShard;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::scanner::language_detect::Language;
use crate::symeval::tables::{WEAK_CIPHERS, WEAK_DIGESTS};
use crate::symeval::Evaluator;
use crate::syntax::readers::common::{arguments_of, split_callee};
use crate::syntax::{type_base, Value};

/// Types that are weak by construction.
const JAVA_WEAK_TYPES: [&str; 6] = [
    "Md4PasswordEncoder",
    "Md5PasswordEncoder",
    "ShaPasswordEncoder",
    "LdapShaPasswordEncoder",
    "MessageDigestPasswordEncoder",
    "NullCipher",
];

const C_SHARP_WEAK_TYPES: [&str; 7] = [
    "DESCryptoServiceProvider",
    "TripleDESCryptoServiceProvider",
    "RC2CryptoServiceProvider",
    "MD5CryptoServiceProvider",
    "SHA1CryptoServiceProvider",
    "SHA1Managed",
    "HMACMD5",
];

/// Static factories of weak primitives.
const C_SHARP_WEAK_FACTORIES: [&str; 5] = ["MD5", "SHA1", "DES", "RC2", "TripleDES"];

/// Algorithms that are weak in any mode.
const WEAK_ALGORITHMS: [&str; 3] = ["3des", "arcfour", "desedewrap"];

pub struct InsecureCipher(pub Method);

impl Query for InsecureCipher {
    fn method(&self) -> Method {
        self.0
    }

    fn matches(&self, ctx: &QueryContext<'_>, shard: &GraphShard) -> Vec<NodeId> {
        let graph = &shard.graph;
        let evaluator = ctx.evaluator(self.0.finding());
        graph
            .node_ids()
            .filter(|n| match graph.kind(*n) {
                NodeKind::ObjectCreation => is_weak_creation(graph, shard.language, *n),
                NodeKind::Call => is_weak_call(&evaluator, shard, *n),
                _ => false,
            })
            .collect()
    }
}

fn is_weak_creation(graph: &Graph, language: Language, n_id: NodeId) -> bool {
    let Some(type_node) = graph
        .child_by_field(n_id, "type")
        .or_else(|| graph.child_by_kind(n_id, NodeKind::Type))
    else {
        return false;
    };
    let text = graph.source_text(type_node);
    let base = type_base(&text);
    let simple = base.rsplit('.').next().unwrap_or(base);
    match language {
        Language::CSharp => C_SHARP_WEAK_TYPES.contains(&simple),
        _ => JAVA_WEAK_TYPES.contains(&simple),
    }
}

fn is_weak_call(evaluator: &Evaluator<'_>, shard: &GraphShard, n_id: NodeId) -> bool {
    let graph = &shard.graph;
    let Some((Some(receiver), name)) = split_callee(graph, n_id) else {
        return false;
    };
    let receiver = graph.source_text(receiver);
    let receiver = receiver.rsplit('.').next().unwrap_or(&receiver);
    match (shard.language, receiver, name.as_str()) {
        (Language::CSharp, factory, "Create") => C_SHARP_WEAK_FACTORIES.contains(&factory),
        (Language::CSharp, _, _) => false,
        (_, "NoOpPasswordEncoder", "getInstance") => true,
        (_, "Cipher", "getInstance") => {
            first_argument_text(evaluator, shard, n_id).is_some_and(|t| is_weak_transformation(&t))
        }
        (_, "MessageDigest", "getInstance") => first_argument_text(evaluator, shard, n_id)
            .is_some_and(|t| WEAK_DIGESTS.contains(&t.to_ascii_lowercase().as_str())),
        _ => false,
    }
}

/// The string the first argument of a call evaluates to.
fn first_argument_text(evaluator: &Evaluator<'_>, shard: &GraphShard, call: NodeId) -> Option<String> {
    let graph = &shard.graph;
    let arguments = arguments_of(graph, call)?;
    let mut argument = graph.named_children(arguments).next()?;
    if graph.kind(argument) == NodeKind::Argument {
        argument = graph.named_children(argument).last()?;
    }
    match evaluator.evaluate_value(shard, argument)? {
        Value::Str(text) => Some(text),
        _ => None,
    }
}

/// `algorithm[/mode[/padding]]` naming a weak cipher, or AES with the
/// provider's default ECB mode.
pub fn is_weak_transformation(transformation: &str) -> bool {
    let lower = transformation.to_ascii_lowercase();
    let mut parts = lower.split('/').map(str::trim);
    let algorithm = parts.next().unwrap_or_default();
    let mode = parts.next();
    if WEAK_CIPHERS.contains(&algorithm) || WEAK_ALGORITHMS.contains(&algorithm) {
        return true;
    }
    if mode.is_some_and(|m| WEAK_CIPHERS.contains(&m)) {
        return true;
    }
    algorithm == "aes" && mode.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GraphDb;

    fn lines(method: Method, path: &str, source: &str) -> Vec<u32> {
        let shard = GraphShard::from_text(path, method.language(), source).unwrap();
        let db = GraphDb::from_shards(vec![shard]);
        let ctx = QueryContext::new(&db);
        let shard = &db.shards()[0];
        InsecureCipher(method)
            .matches(&ctx, shard)
            .into_iter()
            .map(|n| shard.line_of(n))
            .collect()
    }

    #[test]
    fn transformations() {
        assert!(is_weak_transformation("DES"));
        assert!(is_weak_transformation("DESede/CBC/PKCS5Padding"));
        assert!(is_weak_transformation("AES"));
        assert!(is_weak_transformation("AES/ECB/PKCS5Padding"));
        assert!(!is_weak_transformation("AES/GCM/NoPadding"));
    }

    #[test]
    fn java_cipher_algorithm_is_folded_through_variables() {
        let source = "\
import javax.crypto.Cipher;

class Crypto {
    void weak() throws Exception {
        String algorithm = \"DES\";
        Cipher cipher = Cipher.getInstance(algorithm);
    }

    void strong() throws Exception {
        Cipher cipher = Cipher.getInstance(\"AES/GCM/NoPadding\");
    }
}
";
        assert_eq!(lines(Method::JavaInsecureCipher, "Crypto.java", source), vec![6]);
    }

    #[test]
    fn java_weak_digest() {
        let source = "\
import java.security.MessageDigest;

class Hash {
    byte[] digest(byte[] data) throws Exception {
        return MessageDigest.getInstance(\"MD5\").digest(data);
    }
}
";
        assert_eq!(lines(Method::JavaInsecureCipher, "Hash.java", source), vec![5]);
    }

    #[test]
    fn c_sharp_weak_providers() {
        let source = "\
using System.Security.Cryptography;

class Hash
{
    void Run()
    {
        var md5 = MD5.Create();
        var des = new DESCryptoServiceProvider();
        var sha = SHA256.Create();
    }
}
";
        assert_eq!(lines(Method::CSharpInsecureCipher, "Hash.cs", source), vec![7, 8]);
    }
}
