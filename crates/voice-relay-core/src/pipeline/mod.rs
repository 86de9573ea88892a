mod collaborators;
mod runner;

pub use {
    collaborators::{
        DeferredTranscriber, FallbackTranslator, PivotTranslator, Synthesizer, Transcriber,
        Translator, VoiceParams,
    },
    runner::{Pipeline, PipelineOutcome, PipelineSettings},
};
