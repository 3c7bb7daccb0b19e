//! Graph benchmarks: shard building per language, db assembly, and one
//! evaluated query over the result.
//!
//! Run with: cargo bench -p skims-sast --bench graph_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use skims_core::config::SkimsConfig;
use skims_core::traits::CancellationToken;
use skims_sast::db::{build_graph_db, GraphShard};
use skims_sast::parsers::ParserManager;
use skims_sast::queries::{run_queries, Finding};
use skims_sast::scanner::language_detect::Language;
use skims_sast::scanner::types::SourceFile;

/// Sample source for `lang`, varied by `idx` so the parse cache misses.
fn sample_source(lang: Language, idx: usize) -> (String, String) {
    match lang {
        Language::Java => (
            format!("Handler{idx}.java"),
            format!(
                r#"import javax.servlet.http.HttpServletRequest;

class Handler{idx} {{
    private int retries = {idx};

    void handle(HttpServletRequest request) throws Exception {{
        String cmd = request.getParameter("cmd");
        for (int i = 0; i < retries; i++) {{
            if (cmd.isEmpty()) {{
                break;
            }}
        }}
        switch (retries) {{
            case 1: cmd = "ls"; break;
            case 2: cmd = cmd.trim(); break;
        }}
        try {{
            new ProcessBuilder(cmd).start();
        }} catch (Exception e) {{
        }}
    }}
}}
"#
            ),
        ),
        Language::Python => (
            format!("job_{idx}.py"),
            format!(
                r#"def run_{idx}(items):
    total = 0
    for item in items:
        if item > {idx}:
            total += item
    try:
        return total
    except Exception as e:
        return None
"#
            ),
        ),
        Language::Go => (
            format!("main_{idx}.go"),
            format!(
                r#"package main

func sum{idx}(values []int) int {{
	total := 0
	for _, v := range values {{
		switch v {{
		case {idx}:
			total += v
		default:
			total -= 1
		}}
	}}
	return total
}}
"#
            ),
        ),
        _ => (
            format!("file_{idx}.js"),
            format!(
                r#"function compute_{idx}(a, b) {{
    switch (a) {{
        case 1: return b;
    }}
    return a + b * {idx};
}}
"#
            ),
        ),
    }
}

fn samples(lang: Language, count: usize) -> Vec<SourceFile> {
    (0..count)
        .map(|i| {
            let (path, source) = sample_source(lang, i);
            SourceFile::new(path, lang, source.into_bytes())
        })
        .collect()
}

fn shard_per_language(c: &mut Criterion) {
    let mut group = c.benchmark_group("shard_build");
    group.sample_size(20);

    for lang in [Language::Java, Language::Python, Language::Go, Language::JavaScript] {
        let files = samples(lang, 50);
        group.bench_with_input(
            BenchmarkId::new("build_50", format!("{lang:?}")),
            &files,
            |b, files| {
                b.iter(|| {
                    let parsers = ParserManager::new();
                    for file in files {
                        let _ = GraphShard::from_source(file, &parsers);
                    }
                });
            },
        );
    }

    group.finish();
}

fn db_and_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_db");
    group.sample_size(10);

    let files = samples(Language::Java, 100);
    let config = SkimsConfig::default();

    group.bench_function("build_100_java", |b| {
        b.iter(|| build_graph_db(&files, &config, &CancellationToken::new()));
    });

    let db = build_graph_db(&files, &config, &CancellationToken::new()).data;
    group.bench_function("command_injection_100_java", |b| {
        b.iter(|| run_queries(&db, &[Finding::F004]));
    });
    group.bench_function("all_findings_100_java", |b| {
        b.iter(|| run_queries(&db, &Finding::ALL));
    });

    group.finish();
}

criterion_group!(benches, shard_per_language, db_and_queries);
criterion_main!(benches);
