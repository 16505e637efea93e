use std::{fmt::Display, future::Future, time::Duration};

use super::{Label, QuestionData};

/// How long a quiz stays open for voting unless configured otherwise.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(600);

type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Open,
    Tallying,
    Closed,
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::Open => "open",
            State::Tallying => "tallying",
            State::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub enum SessionError {
    InvalidTransition { from: State, action: &'static str },
    /// The voting mechanism failed to place markers or report counts.
    Ballot(Box<dyn std::error::Error + Send + Sync>),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidTransition { from, action } => {
                write!(f, "Cannot {} a quiz that is {}", action, from)
            }
            SessionError::Ballot(e) => write!(f, "Voting failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Ballot(e) => Some(e.as_ref()),
            SessionError::InvalidTransition { .. } => None,
        }
    }
}

fn ballot_error<E>(e: E) -> SessionError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SessionError::Ballot(Box::new(e))
}

/// The voting mechanism a session is run over.
pub trait Ballot: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Adds the session's own marker for every label, in order.
    fn place_markers(
        &mut self,
        labels: &[Label],
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;

    /// Current counts per label, markers included, in the order the
    /// mechanism reports them.
    fn raw_counts(
        &mut self,
    ) -> impl Future<Output = std::result::Result<Vec<(Label, u64)>, Self::Error>> + Send;
}

/// Vote counts after discounting the session's own markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: Vec<(Label, u64)>,
}

impl Tally {
    /// Every raw count is decremented by one, whether or not the marker for
    /// that label is still present.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (Label, u64)>,
    {
        Self {
            counts: raw
                .into_iter()
                .map(|(label, count)| (label, count.saturating_sub(1)))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts in the order they were reported.
    pub fn counts(&self) -> &[(Label, u64)] {
        &self.counts
    }

    /// The first label holding the highest count, or `None` if nobody voted.
    pub fn most_voted(&self) -> Option<Label> {
        self.counts
            .iter()
            .fold(None, |best: Option<(Label, u64)>, &(label, count)| match best {
                Some((_, top)) if count <= top => best,
                _ if count == 0 => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct {
        label: Label,
    },
    Incorrect {
        correct: Label,
        most_voted: Option<Label>,
    },
}

impl Verdict {
    pub fn decide(tally: &Tally, correct: Label) -> Self {
        match tally.most_voted() {
            Some(label) if label == correct => Verdict::Correct { label },
            most_voted => Verdict::Incorrect {
                correct,
                most_voted,
            },
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Correct { label } => {
                write!(f, "\u{2705} Correct! The right answer was **{}**!", label)
            }
            Verdict::Incorrect { correct, .. } => {
                write!(f, "\u{274c} Incorrect! The right answer was **{}**.", correct)
            }
        }
    }
}

/// One quiz from publication to verdict.
#[derive(Debug, Clone)]
pub struct QuizSession {
    question: QuestionData,
    state: State,
    vote_counts: Tally,
    window: Duration,
}

impl QuizSession {
    pub fn open(question: QuestionData, window: Duration) -> Self {
        Self {
            question,
            state: State::Open,
            vote_counts: Tally::default(),
            window,
        }
    }

    pub fn question(&self) -> &QuestionData {
        &self.question
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn vote_counts(&self) -> &Tally {
        &self.vote_counts
    }

    /// Records the discounted counts and moves to `Tallying`.
    pub fn tally<I>(&mut self, raw: I) -> Result<&Tally>
    where
        I: IntoIterator<Item = (Label, u64)>,
    {
        self.expect_state(State::Open, "tally")?;
        self.vote_counts = Tally::from_raw(raw);
        self.state = State::Tallying;
        Ok(&self.vote_counts)
    }

    pub fn close(&mut self) -> Result<Verdict> {
        self.expect_state(State::Tallying, "close")?;
        self.state = State::Closed;
        Ok(self.decide())
    }

    /// The verdict of a closed session. Recomputed from the stored counts.
    pub fn verdict(&self) -> Result<Verdict> {
        self.expect_state(State::Closed, "judge")?;
        Ok(self.decide())
    }

    /// Places the markers, waits out the window, then tallies and closes.
    /// Returns the closed session.
    ///
    /// The wait cannot be cut short.
    pub async fn run<B: Ballot>(mut self, ballot: &mut B) -> Result<QuizSession> {
        self.expect_state(State::Open, "run")?;
        ballot
            .place_markers(&Label::ALL)
            .await
            .map_err(ballot_error)?;

        log::info!(
            "Quiz `{}` is open for {}s",
            self.question.prompt(),
            self.window.as_secs()
        );
        tokio::time::sleep(self.window).await;

        let raw = ballot.raw_counts().await.map_err(ballot_error)?;
        if self.tally(raw)?.is_empty() {
            log::warn!("No answer markers left on quiz `{}`", self.question.prompt());
        }
        self.close()?;
        Ok(self)
    }

    fn decide(&self) -> Verdict {
        Verdict::decide(&self.vote_counts, self.question.correct_label())
    }

    fn expect_state(&self, expected: State, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }
}
