use crate::session::GenerationStatus;

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Default, Clone)]
pub struct Spinner {
    current_frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_frame(&mut self) {
        self.current_frame = (self.current_frame + 1) % SPINNER_CHARS.len();
    }

    pub fn get_frame(&self) -> char {
        SPINNER_CHARS[self.current_frame]
    }
}

// The step indicator text, only while something is in flight.
pub fn spinner_frame(spinner: &Spinner, status: GenerationStatus) -> Option<String> {
    status
        .step_label()
        .map(|label| format!(" {} {}... ", spinner.get_frame(), label))
}
