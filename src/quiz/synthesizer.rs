use std::{
    fmt::Display,
    sync::{Mutex, PoisonError},
};

use rand::{seq::SliceRandom, Rng};

use super::{Label, QuestionData, OPTION_COUNT};
use crate::{
    completion::{CompletionError, CompletionService},
    tutor,
};

type Result<T> = std::result::Result<T, SynthesisError>;

/// Separates the question and its options in the upstream reply.
pub const DELIMITER: &str = "---";

/// Question, two wrong options and the correct option.
const SEGMENT_COUNT: usize = OPTION_COUNT + 1;

const SYSTEM_INSTRUCTION: &str = "\
Generate a single Python-related multiple-choice question.
Try to find creative questions and don't be afraid to add moderate or even hard ones.
It is very important that your response follows the format below, without intro or outro.
The question should have:
- Three answer options.
- Only one correct answer.
Format:
<question> --- <wrong option no 1> --- <wrong option no 2> --- <correct answer>";

#[derive(Debug)]
pub enum SynthesisError {
    /// The reply did not split into exactly four segments.
    MalformedUpstreamResponse { segments: usize },
    Upstream(CompletionError),
}

impl From<CompletionError> for SynthesisError {
    fn from(e: CompletionError) -> Self {
        SynthesisError::Upstream(e)
    }
}

impl Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisError::MalformedUpstreamResponse { segments } => write!(
                f,
                "Malformed question: expected {} segments separated by `{}`, got {}",
                SEGMENT_COUNT, DELIMITER, segments
            ),
            SynthesisError::Upstream(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthesisError::Upstream(e) => Some(e),
            SynthesisError::MalformedUpstreamResponse { .. } => None,
        }
    }
}

/// A reply split into its segments, before the options are shuffled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub question: String,
    pub wrong: [String; 2],
    pub correct: String,
}

impl ParsedReply {
    /// The options in reply order: both wrong options, then the correct one.
    pub fn working_set(&self) -> [String; OPTION_COUNT] {
        [
            self.wrong[0].clone(),
            self.wrong[1].clone(),
            self.correct.clone(),
        ]
    }

    /// Shuffles the options and tracks where the correct one ends up.
    pub fn into_question<R: Rng + ?Sized>(self, rng: &mut R) -> QuestionData {
        let mut working = self.working_set();
        working.shuffle(rng);
        self.arrange(working)
    }

    /// Labels `working` in the given order. The first option whose text
    /// equals the correct answer is marked correct.
    pub fn arrange(self, working: [String; OPTION_COUNT]) -> QuestionData {
        if has_duplicates(&working) {
            log::warn!(
                "Question `{}` has duplicate options, the first match is taken as correct",
                self.question
            );
        }

        let correct_label = working
            .iter()
            .position(|option| *option == self.correct)
            .and_then(Label::from_index)
            .unwrap_or(Label::Three);

        QuestionData::new(self.question, working, correct_label)
    }
}

fn has_duplicates(options: &[String]) -> bool {
    options
        .iter()
        .enumerate()
        .any(|(i, option)| options[i + 1..].contains(option))
}

/// Splits a raw reply into a question and its three options.
pub fn parse_reply(reply: &str) -> Result<ParsedReply> {
    let segments: Vec<&str> = reply.split(DELIMITER).map(str::trim).collect();

    match segments.as_slice() {
        [question, wrong1, wrong2, correct] => Ok(ParsedReply {
            question: question.to_string(),
            wrong: [wrong1.to_string(), wrong2.to_string()],
            correct: correct.to_string(),
        }),
        _ => Err(SynthesisError::MalformedUpstreamResponse {
            segments: segments.len(),
        }),
    }
}

fn user_instruction(topic: &str) -> String {
    format!(
        "Generate a new question about {} please. Remember to stick to the format.",
        topic
    )
}

/// Generates a new multiple choice question.
///
/// Without a `topic_hint`, a topic is picked at random from [`tutor::TOPICS`].
/// The rng is only locked around the synchronous steps.
pub async fn generate<C, R>(
    service: &C,
    rng: &Mutex<R>,
    topic_hint: Option<&str>,
) -> Result<QuestionData>
where
    C: CompletionService,
    R: Rng + Send,
{
    let topic = pick_topic(rng, topic_hint);
    log::debug!("Generating quiz question about {}", topic);

    let reply = service
        .complete(SYSTEM_INSTRUCTION, &user_instruction(&topic))
        .await?;
    let parsed = parse_reply(&reply)?;

    let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(parsed.into_question(&mut *rng))
}

fn pick_topic<R: Rng>(rng: &Mutex<R>, topic_hint: Option<&str>) -> String {
    match topic_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
        Some(hint) => hint.to_string(),
        None => {
            let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
            tutor::random_topic(&mut *rng).to_string()
        }
    }
}
