
pub mod session;
pub mod synthesizer;

use std::fmt::Display;

/// Number of options every quiz question carries.
pub const OPTION_COUNT: usize = 3;

/// An ordinal marker attached to a quiz option, used both for display and
/// for voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    One,
    Two,
    Three,
}

impl Label {
    /// All labels, in display order.
    pub const ALL: [Label; OPTION_COUNT] = [Label::One, Label::Two, Label::Three];

    pub fn from_index(index: usize) -> Option<Label> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Label::One => 0,
            Label::Two => 1,
            Label::Three => 2,
        }
    }

    /// The keycap emoji used as the reaction marker for this label.
    pub fn emoji(self) -> &'static str {
        match self {
            Label::One => "1\u{fe0f}\u{20e3}",
            Label::Two => "2\u{fe0f}\u{20e3}",
            Label::Three => "3\u{fe0f}\u{20e3}",
        }
    }

    pub fn from_emoji(emoji: &str) -> Option<Label> {
        Self::ALL.into_iter().find(|label| label.emoji() == emoji)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.emoji())
    }
}

/// A labeled answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub label: Label,
    pub text: String,
}

impl Display for QuizOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.text)
    }
}

/// A generated multiple choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionData {
    prompt: String,
    options: [QuizOption; OPTION_COUNT],
    correct_label: Label,
}

impl QuestionData {
    /// Labels `working` in order, so its first entry becomes option 1.
    pub fn new(prompt: String, working: [String; OPTION_COUNT], correct_label: Label) -> Self {
        let [first, second, third] = working;

        Self {
            prompt,
            options: [
                QuizOption {
                    label: Label::One,
                    text: first,
                },
                QuizOption {
                    label: Label::Two,
                    text: second,
                },
                QuizOption {
                    label: Label::Three,
                    text: third,
                },
            ],
            correct_label,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in display order.
    pub fn options(&self) -> &[QuizOption] {
        &self.options
    }

    pub fn correct_label(&self) -> Label {
        self.correct_label
    }

    pub fn correct_option(&self) -> &QuizOption {
        &self.options[self.correct_label.index()]
    }
}
