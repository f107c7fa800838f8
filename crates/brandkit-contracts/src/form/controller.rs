use std::fmt;
use std::time::{Duration, Instant};

use crate::brand::GenerationOutcome;
use crate::catalog::{Industry, Tone, ToneTable, Touchpoint, MAX_TONES_PER_CATEGORY, TONE_TABLE};
use crate::i18n::{Bilingual, Language};

use super::input::FormInput;
use super::validation::{
    toggle_tone, validate_details, validate_tones, ToneToggle, ValidationError,
};

/// How long a validation notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

const LOADING_MESSAGES: [(&str, &str); 4] = [
    (
        "Analyzing your brand DNA...",
        "브랜드 DNA를 분석하고 있습니다...",
    ),
    (
        "Mixing the color palette...",
        "컬러 팔레트를 조합하고 있습니다...",
    ),
    (
        "Pairing typography...",
        "타이포그래피를 매칭하고 있습니다...",
    ),
    (
        "Writing your brand story...",
        "브랜드 스토리를 작성하고 있습니다...",
    ),
];

pub const LOADING_MESSAGE_COUNT: usize = LOADING_MESSAGES.len();

pub fn loading_message(index: usize) -> Bilingual {
    let (en, ko) = LOADING_MESSAGES[index % LOADING_MESSAGE_COUNT];
    Bilingual::new(en, ko)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormStep {
    Details,
    Tones,
    Constraints,
}

impl FormStep {
    pub fn number(self) -> u8 {
        match self {
            FormStep::Details => 1,
            FormStep::Tones => 2,
            FormStep::Constraints => 3,
        }
    }

    fn following(self) -> Option<Self> {
        match self {
            FormStep::Details => Some(FormStep::Tones),
            FormStep::Tones => Some(FormStep::Constraints),
            FormStep::Constraints => None,
        }
    }

    fn preceding(self) -> Option<Self> {
        match self {
            FormStep::Details => None,
            FormStep::Tones => Some(FormStep::Details),
            FormStep::Constraints => Some(FormStep::Tones),
        }
    }
}

/// The four mutually exclusive screens. Each variant owns only what that
/// screen needs.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Landing,
    Form { step: FormStep, input: FormInput },
    Loading { input: FormInput, status_index: usize },
    Result { input: FormInput, outcome: GenerationOutcome },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Landing => "landing",
            View::Form { .. } => "form",
            View::Loading { .. } => "loading",
            View::Result { .. } => "result",
        }
    }

    pub fn input(&self) -> Option<&FormInput> {
        match self {
            View::Landing => None,
            View::Form { input, .. } | View::Loading { input, .. } | View::Result { input, .. } => {
                Some(input)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub error: ValidationError,
    pub raised_at: Instant,
}

impl Notice {
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < NOTICE_DURATION
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    Validation(ValidationError),
    InvalidTransition {
        view: &'static str,
        action: &'static str,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::Validation(err) => write!(f, "{err}"),
            FlowError::InvalidTransition { view, action } => {
                write!(f, "'{action}' is not available on the {view} screen")
            }
        }
    }
}

impl std::error::Error for FlowError {}

impl From<ValidationError> for FlowError {
    fn from(value: ValidationError) -> Self {
        FlowError::Validation(value)
    }
}

fn invalid(view: &View, action: &'static str) -> FlowError {
    FlowError::InvalidTransition {
        view: view.name(),
        action,
    }
}

/// Owns the session's form and view state. Every user action is one method
/// call; state only changes when the call succeeds.
#[derive(Debug, Clone)]
pub struct FormController {
    view: View,
    language: Language,
    notice: Option<Notice>,
    tone_table: ToneTable,
    tone_limit: usize,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::with_tone_table(TONE_TABLE, MAX_TONES_PER_CATEGORY)
    }

    pub fn with_tone_table(tone_table: ToneTable, tone_limit: usize) -> Self {
        Self {
            view: View::Landing,
            language: Language::default(),
            notice: None,
            tone_table,
            tone_limit,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn tone_table(&self) -> &ToneTable {
        &self.tone_table
    }

    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(now))
    }

    pub fn active_notice(&self) -> Option<&Notice> {
        self.notice_at(Instant::now())
    }

    pub fn start(&mut self) -> Result<(), FlowError> {
        if !matches!(self.view, View::Landing) {
            return Err(invalid(&self.view, "start"));
        }
        self.view = View::Form {
            step: FormStep::Details,
            input: FormInput::default(),
        };
        Ok(())
    }

    pub fn set_brand_name(&mut self, name: &str) -> Result<(), FlowError> {
        self.form_input_mut("set_brand_name")?.brand_name = name.to_string();
        Ok(())
    }

    pub fn set_industry(&mut self, industry: Industry) -> Result<(), FlowError> {
        self.form_input_mut("set_industry")?.industry = Some(industry);
        Ok(())
    }

    pub fn set_touchpoint(&mut self, touchpoint: Touchpoint) -> Result<(), FlowError> {
        self.form_input_mut("set_touchpoint")?.touchpoint = Some(touchpoint);
        Ok(())
    }

    pub fn set_negative_preference(&mut self, text: &str) -> Result<(), FlowError> {
        self.form_input_mut("set_negative_preference")?.negative_preference = text.to_string();
        Ok(())
    }

    pub fn toggle_tone(&mut self, tone: Tone) -> Result<ToneToggle, FlowError> {
        let table = self.tone_table;
        let limit = self.tone_limit;
        let input = self.form_input_mut("toggle_tone")?;
        let outcome = toggle_tone(&table, limit, &mut input.selected_tones, tone);
        outcome.map_err(|err| self.raise(err))
    }

    /// Advances one form step if the current step is complete.
    pub fn next(&mut self) -> Result<FormStep, FlowError> {
        let outcome = match &mut self.view {
            View::Form { step, input } => {
                let Some(following) = step.following() else {
                    return Err(FlowError::InvalidTransition {
                        view: "form",
                        action: "next",
                    });
                };
                let check = match step {
                    FormStep::Details => validate_details(input),
                    _ => validate_tones(input),
                };
                if check.is_ok() {
                    *step = following;
                }
                check.map(|()| following)
            }
            other => return Err(invalid(other, "next")),
        };
        outcome.map_err(|err| self.raise(err))
    }

    /// Steps back; leaving step 1 returns to the landing screen and clears
    /// the form.
    pub fn back(&mut self) -> Result<(), FlowError> {
        match &mut self.view {
            View::Form { step, .. } => match step.preceding() {
                Some(previous) => *step = previous,
                None => self.go_home(),
            },
            other => return Err(invalid(other, "back")),
        }
        Ok(())
    }

    /// Leaves step 3 for the loading screen and hands back the input to send.
    ///
    /// Steps 1 and 2 are checked again, since their fields stay editable from
    /// step 3. On failure the form returns to the first incomplete step.
    pub fn begin_generation(&mut self) -> Result<FormInput, FlowError> {
        let check = match &mut self.view {
            View::Form {
                step: step @ FormStep::Constraints,
                input,
            } => {
                let check = validate_details(input)
                    .map_err(|err| (FormStep::Details, err))
                    .and_then(|()| validate_tones(input).map_err(|err| (FormStep::Tones, err)));
                match check {
                    Ok(()) => Ok(input.clone()),
                    Err((incomplete, err)) => {
                        *step = incomplete;
                        Err(err)
                    }
                }
            }
            other => return Err(invalid(other, "generate")),
        };
        let input = check.map_err(|err| self.raise(err))?;
        self.view = View::Loading {
            input: input.clone(),
            status_index: 0,
        };
        Ok(input)
    }

    pub fn advance_status(&mut self) -> Result<usize, FlowError> {
        match &mut self.view {
            View::Loading { status_index, .. } => {
                *status_index = (*status_index + 1) % LOADING_MESSAGE_COUNT;
                Ok(*status_index)
            }
            other => Err(invalid(other, "advance_status")),
        }
    }

    pub fn status_message(&self) -> Option<Bilingual> {
        match &self.view {
            View::Loading { status_index, .. } => Some(loading_message(*status_index)),
            _ => None,
        }
    }

    pub fn finish_generation(&mut self, outcome: GenerationOutcome) -> Result<(), FlowError> {
        if !matches!(self.view, View::Loading { .. }) {
            return Err(invalid(&self.view, "finish_generation"));
        }
        let View::Loading { input, .. } = std::mem::replace(&mut self.view, View::Landing) else {
            unreachable!("view checked above");
        };
        self.view = View::Result { input, outcome };
        Ok(())
    }

    /// Result back to step 1 with the stored answers intact.
    pub fn edit(&mut self) -> Result<(), FlowError> {
        if !matches!(self.view, View::Result { .. }) {
            return Err(invalid(&self.view, "edit"));
        }
        let View::Result { input, .. } = std::mem::replace(&mut self.view, View::Landing) else {
            unreachable!("view checked above");
        };
        self.view = View::Form {
            step: FormStep::Details,
            input,
        };
        Ok(())
    }

    pub fn go_home(&mut self) {
        self.view = View::Landing;
        self.notice = None;
    }

    fn form_input_mut(&mut self, action: &'static str) -> Result<&mut FormInput, FlowError> {
        match &mut self.view {
            View::Form { input, .. } => Ok(input),
            other => Err(invalid(other, action)),
        }
    }

    fn raise(&mut self, error: ValidationError) -> FlowError {
        self.notice = Some(Notice {
            error: error.clone(),
            raised_at: Instant::now(),
        });
        FlowError::Validation(error)
    }
}
