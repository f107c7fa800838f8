mod controller;
mod input;
mod validation;

pub use controller::{
    loading_message, FlowError, FormController, FormStep, Notice, View, LOADING_MESSAGE_COUNT,
    NOTICE_DURATION,
};
pub use input::FormInput;
pub use validation::{
    toggle_tone, validate_details, validate_tones, RequiredField, ToneToggle, ValidationError,
};
