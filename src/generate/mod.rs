pub mod constraints;
pub mod generators;
pub mod locale;
pub mod regex_guard;
pub mod regex_synth;
pub mod value;
