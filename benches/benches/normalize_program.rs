//! Normalization throughput over synthetic programs.
//!
//! Each program has `n` loops of assignments that reference a shared
//! variable table, so reference resolution and the name cache are on the
//! hot path.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fmt::Write;
use urview_syntax::{TextWriter, normalize};

fn synthetic_program(loops: usize) -> String {
    let mut xml = String::from(r#"<URProgram name="bench"><variables>"#);
    for i in 0..8 {
        write!(xml, r#"<ProgramVariable name="v{i}"/>"#).unwrap();
    }
    xml.push_str("</variables><children><MainProgram><children>");
    for i in 0..loops {
        write!(xml, r#"<Loop type="Counting" count="{i}"><children>"#).unwrap();
        for j in 0..8 {
            write!(
                xml,
                r#"<Assignment>
                    <variable reference="/URProgram/variables/ProgramVariable[{}]"/>
                    <expression>
                        <ExpressionVariable><ProgramVariable reference="/URProgram/variables/ProgramVariable[{}]"/></ExpressionVariable>
                        <ExpressionToken token=" + "/>
                        <ExpressionChar character="1"/>
                    </expression>
                </Assignment>"#,
                j + 1,
                (j + 1) % 8 + 1,
            )
            .unwrap();
        }
        xml.push_str("</children></Loop>");
    }
    xml.push_str("</children></MainProgram></children></URProgram>");
    xml
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for loops in [10, 100, 1000] {
        let xml = synthetic_program(loops);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(loops), &doc, |b, doc| {
            b.iter(|| normalize(black_box(doc.root_element())))
        });
    }
    group.finish();
}

fn bench_render_text(c: &mut Criterion) {
    let xml = synthetic_program(1000);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let program = normalize(doc.root_element());
    c.bench_function("render_text_1000", |b| {
        b.iter(|| TextWriter::emit(black_box(&program)))
    });
}

criterion_group!(benches, bench_normalize, bench_render_text);
criterion_main!(benches);
