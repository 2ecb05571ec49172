use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aceprep_core::catalog::SubjectCatalog;
use aceprep_core::model::{Question, QuestionKind, QuestionSet};
use aceprep_core::scoring::{score, AnswerMap};
use aceprep_core::selection::Selection;

fn question_set(n: u32) -> QuestionSet {
    QuestionSet {
        subject: "Physics".into(),
        topic: "Mixed".into(),
        questions: (1..=n)
            .map(|id| Question {
                id,
                kind: if id % 3 == 0 {
                    QuestionKind::Numerical
                } else {
                    QuestionKind::SingleChoice {
                        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    }
                },
                question_text: format!("Question {id}"),
                correct_answer: if id % 3 == 0 { "42".into() } else { "C".into() },
                solution: String::new(),
                difficulty_level: None,
            })
            .collect(),
    }
}

fn answers(n: u32) -> AnswerMap {
    (1..=n)
        .filter(|id| id % 5 != 0)
        .map(|id| {
            let token = match id % 4 {
                0 => "A",
                1 | 2 => "C",
                _ => "42",
            };
            (id, token.to_string())
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    for n in [15u32, 75] {
        let set = question_set(n);
        let map = answers(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&set), black_box(&map)))
        });
    }
    group.finish();
}

fn bench_toggle_all(c: &mut Criterion) {
    let catalog = SubjectCatalog::standard();
    c.bench_function("toggle_all_chemistry", |b| {
        b.iter(|| {
            let mut selection = Selection::new();
            selection.toggle_subject(&catalog, "Chemistry");
            selection.toggle_all_in_subject(&catalog, black_box("Chemistry"));
            selection.toggle_all_in_subject(&catalog, black_box("Chemistry"));
            selection
        })
    });
}

criterion_group!(benches, bench_score, bench_toggle_all);
criterion_main!(benches);
