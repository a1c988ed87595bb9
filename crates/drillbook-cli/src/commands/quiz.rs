//! The `drillbook quiz` command.

use std::io::{self, BufRead};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use drillbook_core::selector::QuizSelector;
use drillbook_core::session::QuizSession;
use drillbook_core::traits::{Clock, SystemClock};

use super::{load, split_tags, GlobalArgs};

pub fn execute(
    global: &GlobalArgs,
    count: Option<usize>,
    tags: Option<String>,
    also: Vec<String>,
    seed: Option<u64>,
) -> Result<()> {
    let mut loaded = load(global)?;
    let count = count.unwrap_or(loaded.config.quiz_size);
    let clock = SystemClock;

    let filter = split_tags(tags.as_deref());
    let mut selector = QuizSelector::new(&loaded.learner, &loaded.bank, &filter, count);
    for extra in &also {
        selector.extend(&loaded.learner, &loaded.bank, &split_tags(Some(extra.as_str())));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let quiz = selector.build(&loaded.learner, &loaded.bank, clock.now(), &mut rng);
    if quiz.is_empty() {
        println!("No questions match the selected tags.");
        return Ok(());
    }

    let mut sink = loaded.workspace.history_sink(&loaded.config.learner);
    let mut session = QuizSession::new(quiz, &loaded.bank, &mut loaded.learner, &mut sink, &clock);
    let total = session.len();
    let mut correct = 0;
    let mut lines = io::stdin().lock().lines();

    while !session.is_complete() {
        let number = session.cursor() + 1;
        let prompt = session.next_question_text()?;
        println!("[{number}/{total}] {prompt}");

        let Some(line) = lines.next().transpose()? else {
            println!("Quiz ended early.");
            break;
        };
        if session.record_answer(line.trim_end_matches('\r'))? {
            correct += 1;
            println!("Correct!");
        } else {
            let accepted = session.last_correct_answers().unwrap_or_default();
            println!("Incorrect. Accepted answer(s): {}", accepted.join(", "));
        }
    }

    println!("\nScore: {correct}/{}", session.cursor());
    Ok(())
}
