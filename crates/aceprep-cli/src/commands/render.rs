//! Terminal rendering of generated results.

use comfy_table::{Cell, Table};

use aceprep_core::model::{
    option_letter, FormulaCard, PyqSolution, Question, QuestionKind, QuestionSet, TimeTable,
};
use aceprep_core::scoring::{Outcome, ScoreResult};

pub fn print_question(question: &Question) {
    println!();
    let tag = match question.kind {
        QuestionKind::SingleChoice { .. } => "MCQ",
        QuestionKind::Numerical => "Numerical",
    };
    match &question.difficulty_level {
        Some(level) => println!("Q{} [{tag}, {level}] {}", question.id, question.question_text),
        None => println!("Q{} [{tag}] {}", question.id, question.question_text),
    }
    for (i, option) in question.options().iter().enumerate() {
        println!("    ({}) {option}", option_letter(i));
    }
}

/// Every question, followed by the answer key.
pub fn print_question_set(set: &QuestionSet) {
    println!("{} / {} ({} questions)", set.subject, set.topic, set.len());
    for question in &set.questions {
        print_question(question);
    }

    println!("\nAnswer key:");
    let mut table = Table::new();
    table.set_header(vec!["Q", "Answer", "Solution"]);
    for question in &set.questions {
        table.add_row(vec![
            Cell::new(question.id),
            Cell::new(&question.correct_answer),
            Cell::new(&question.solution),
        ]);
    }
    println!("{table}");
}

/// Per-question outcomes and the total.
pub fn print_score(set: &QuestionSet, result: &ScoreResult) {
    let mut table = Table::new();
    table.set_header(vec!["Q", "Your answer", "Correct", "Result", "Marks"]);
    for entry in &result.outcomes {
        let correct = set
            .get(entry.question_id)
            .map(|q| q.correct_answer.as_str())
            .unwrap_or("-");
        let label = match entry.outcome {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "wrong",
            Outcome::Skipped => "skipped",
        };
        table.add_row(vec![
            Cell::new(entry.question_id),
            Cell::new(entry.submitted.as_deref().unwrap_or("-")),
            Cell::new(correct),
            Cell::new(label),
            Cell::new(format!("{:+}", entry.outcome.marks())),
        ]);
    }
    println!("{table}");

    println!(
        "Score: {} / {}  ({} correct, {} wrong, {} skipped)",
        result.total,
        result.max_total(),
        result.count(Outcome::Correct),
        result.count(Outcome::Incorrect),
        result.count(Outcome::Skipped),
    );

    let missed: Vec<&Question> = result
        .outcomes
        .iter()
        .filter(|o| o.outcome != Outcome::Correct)
        .filter_map(|o| set.get(o.question_id))
        .collect();
    if !missed.is_empty() {
        println!("\nSolutions:");
        for question in missed {
            println!("  Q{}: {}", question.id, question.solution);
        }
    }
}

pub fn print_formula_card(card: &FormulaCard) {
    println!("{}", card.title);
    println!("\nFormulas:");
    for formula in &card.formulas {
        println!("  - {formula}");
    }
    println!("\nKey concepts:");
    for concept in &card.concepts {
        println!("  - {concept}");
    }
    if !card.reactions.is_empty() {
        println!("\nReactions:");
        for reaction in &card.reactions {
            println!("  - {reaction}");
        }
    }
    println!("\nPro tip: {}", card.pro_tip);
}

pub fn print_time_table(plan: &TimeTable) {
    println!("{}", plan.title);
    println!("{}\n", plan.description);

    let mut table = Table::new();
    table.set_header(vec!["Time", "Activity", "Subject", "Topic", "Type"]);
    for slot in &plan.schedule {
        table.add_row(vec![
            Cell::new(&slot.time),
            Cell::new(&slot.activity),
            Cell::new(&slot.subject),
            Cell::new(&slot.topic),
            Cell::new(slot.kind),
        ]);
    }
    println!("{table}");

    if !plan.tips.is_empty() {
        println!("\nTips:");
        for tip in &plan.tips {
            println!("  - {tip}");
        }
    }
}

pub fn print_solution(solution: &PyqSolution) {
    println!("Underlying concept:\n{}\n", solution.underlying_concept);
    println!("Derivation:\n{}\n", solution.mathematical_derivation);
    println!("Pro tip: {}", solution.pro_tip);
}
