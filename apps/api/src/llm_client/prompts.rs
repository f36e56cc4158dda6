// Request payload shared by every completion call.
// Each pipeline that talks to the oracle defines its own template alongside
// it and builds a `PromptPayload` from these pieces.

/// Engine used when a caller does not pick one.
pub const DEFAULT_ENGINE: &str = "text-curie-001";
/// Output budget used when a caller does not pick one.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Sampling and budget knobs sent with a completion request.
///
/// The defaults are fully deterministic (temperature 0) and neutral
/// (top-p 1, no penalties).
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub engine: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            temperature: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl GenerationParams {
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A fully assembled completion request. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct PromptPayload {
    prompt: String,
    params: GenerationParams,
}

impl PromptPayload {
    pub fn new(prompt: String, params: GenerationParams) -> Self {
        Self { prompt, params }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_deterministic_and_neutral() {
        let params = GenerationParams::default();
        assert_eq!(params.engine, "text-curie-001");
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.max_tokens, 100);
        assert_eq!(params.top_p, 1.0);
        assert_eq!(params.frequency_penalty, 0.0);
        assert_eq!(params.presence_penalty, 0.0);
    }

    #[test]
    fn test_builders_override_only_their_field() {
        let params = GenerationParams::default()
            .with_engine("gpt-3.5-turbo-instruct")
            .with_max_tokens(1500);
        assert_eq!(params.engine, "gpt-3.5-turbo-instruct");
        assert_eq!(params.max_tokens, 1500);
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.top_p, 1.0);
    }
}
