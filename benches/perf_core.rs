use criterion::{black_box, criterion_group, criterion_main, Criterion};
use patchwright::agentic::{extract_code_blocks, identify_fix_blocks, inline_diff, validate_syntax};

fn synthetic_script(function_count: usize) -> String {
    let mut script = String::from("#!/bin/bash\nset -euo pipefail\n\n");
    for i in 0..function_count {
        script.push_str(&format!(
            "step_{i:04}() {{\n  if [ -n \"${{TARGET:-}}\" ]; then\n    for f in a b c; do\n      echo \"{i} $f\"\n    done\n  fi\n  case \"$1\" in\n    start) echo start ;;\n    *) echo other ;;\n  esac\n}}\n\n"
        ));
    }
    script
}

fn bench_validate_syntax(c: &mut Criterion) {
    let script = synthetic_script(500);
    c.bench_function("validate_syntax_bash_500_functions", |b| {
        b.iter(|| {
            black_box(validate_syntax(black_box(&script), "bash").is_ok());
        });
    });
}

fn bench_inline_diff(c: &mut Criterion) {
    let original = synthetic_script(1_000);
    let modified = original.replacen("step_0500()", "step_0500_renamed()", 1);
    c.bench_function("inline_diff_single_change_12k_lines", |b| {
        b.iter(|| {
            black_box(inline_diff(black_box(&original), black_box(&modified)).len());
        });
    });
}

fn bench_extract_and_select(c: &mut Criterion) {
    let mut response = String::from("Here are the changes you asked for.\n\n");
    for i in 0..50 {
        response.push_str(&format!("Step {i}:\n```bash\n{}```\n\n", synthetic_script(4)));
        response.push_str("```python\nprint('unrelated')\n```\n");
    }
    c.bench_function("extract_and_select_100_blocks", |b| {
        b.iter(|| {
            let blocks = extract_code_blocks(black_box(&response));
            black_box(identify_fix_blocks(&blocks, "bash").len());
        });
    });
}

criterion_group!(
    perf_core,
    bench_validate_syntax,
    bench_inline_diff,
    bench_extract_and_select
);
criterion_main!(perf_core);
