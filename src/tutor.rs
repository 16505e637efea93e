use rand::{seq::SliceRandom, Rng};

use crate::completion::{CompletionError, CompletionService};

/// Topics used to vary what the completion service is asked about.
pub const TOPICS: &[&str] = &[
    "list comprehensions",
    "dictionaries",
    "sets",
    "string formatting",
    "slicing",
    "functions and default arguments",
    "*args and **kwargs",
    "lambda functions",
    "closures and scope",
    "decorators",
    "generators",
    "iterators",
    "context managers",
    "exceptions",
    "classes and inheritance",
    "dunder methods",
    "dataclasses",
    "type hints",
    "modules and imports",
    "the itertools module",
    "the collections module",
    "file handling",
    "recursion",
    "async and await",
    "mutability and references",
];

const CHALLENGE_INSTRUCTION: &str = "\
You are an expert Python programmer and teacher.
Your task is to generate a fun and tricky Python task.
The task should not be overly complicated and moderately hard.
The task should involve writing a function that achieves something.
The task should not take too long to complete and be more fun than hard.
Explain the task in a short and concise way while at the same time being clear on the task.";

const EXPLAIN_INSTRUCTION: &str = "\
You are a Python expert providing concise explanations.
For each Python concept:
1. Provide a 2-3 sentence explanation
2. Include a short, practical code example
3. Keep your response brief and focused";

const ANSWER_INSTRUCTION: &str = "\
You are a friendly Python expert answering questions from learners.
Answer the question accurately and concisely.
Include a short code example only when it helps.
If the question is not about Python or programming, say so briefly and answer anyway if you can.";

pub fn random_topic<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    // TOPICS is never empty.
    TOPICS.choose(rng).copied().unwrap_or("Python")
}

/// A short function-writing task about `topic`.
pub async fn challenge<C: CompletionService>(
    service: &C,
    topic: &str,
) -> Result<String, CompletionError> {
    log::debug!("Generating challenge about {}", topic);
    let user = format!(
        "Generate a new task about {} please. Remember to stick to the format.",
        topic
    );
    service.complete(CHALLENGE_INSTRUCTION, &user).await
}

pub async fn explain<C: CompletionService>(
    service: &C,
    concept: &str,
) -> Result<String, CompletionError> {
    log::debug!("Explaining {}", concept);
    let user = format!("Explain the Python concept: {}", concept);
    service.complete(EXPLAIN_INSTRUCTION, &user).await
}

pub async fn answer<C: CompletionService>(
    service: &C,
    question: &str,
) -> Result<String, CompletionError> {
    log::debug!("Answering {}", question);
    service.complete(ANSWER_INSTRUCTION, question).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    /// Records every request and replies with a fixed text.
    struct Recorder {
        reply: &'static str,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl Recorder {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CompletionService for Recorder {
        async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
            self.requests
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.to_string())
        }
    }

    struct Unreachable;

    impl CompletionService for Unreachable {
        async fn complete(&self, _: &str, _: &str) -> Result<String, CompletionError> {
            Err(CompletionError::EmptyResponse)
        }
    }

    #[test]
    fn random_topic_comes_from_list() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(TOPICS.contains(&random_topic(&mut rng)));
        }
    }

    #[tokio::test]
    async fn explain_passes_reply_through_unmodified() {
        let service = Recorder::new("  Decorators wrap functions.\n```py\n@wraps\n```  ");

        let text = explain(&service, "decorators").await.unwrap();

        assert_eq!(text, "  Decorators wrap functions.\n```py\n@wraps\n```  ");
        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, EXPLAIN_INSTRUCTION);
        assert_eq!(requests[0].1, "Explain the Python concept: decorators");
    }

    #[tokio::test]
    async fn challenge_mentions_topic() {
        let service = Recorder::new("Write a function...");

        challenge(&service, "generators").await.unwrap();

        let requests = service.requests();
        assert_eq!(requests[0].0, CHALLENGE_INSTRUCTION);
        assert!(requests[0].1.contains("generators"));
    }

    #[tokio::test]
    async fn answer_sends_question_verbatim() {
        let service = Recorder::new("Use `is` for identity.");

        answer(&service, "When do I use is instead of ==?")
            .await
            .unwrap();

        assert_eq!(service.requests()[0].1, "When do I use is instead of ==?");
    }

    #[tokio::test]
    async fn upstream_errors_are_returned() {
        let result = answer(&Unreachable, "anything").await;
        assert!(matches!(result, Err(CompletionError::EmptyResponse)));
    }
}
