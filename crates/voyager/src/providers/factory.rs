use anyhow::Result;

use super::{
    base::Provider, configs::ProviderConfig, groq::GroqProvider, openai::OpenAiProvider,
};

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Groq(groq_config) => Ok(Box::new(GroqProvider::new(groq_config)?)),
    }
}
