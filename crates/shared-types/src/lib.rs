pub mod assets;
pub mod validation;

pub use assets::{
    AssetBundle, AssetId, BlogOutline, BlogOutlineBody, Messaging, Persona, Script, ScriptSections,
};
pub use validation::{
    AiCheckResult, AiCheckScores, AutoFixOutcome, AutoFixResult, GlobalValidationResult,
    HardCheckResult, UpdatedIds, ValidationRequest,
};
