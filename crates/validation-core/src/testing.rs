//! In-memory collaborators and asset fixtures for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use shared_types::{AssetId, BlogOutline, Messaging, Persona, Script, ScriptSections};
use uuid::Uuid;

use crate::collaborators::{AssetLookup, ContentGenerator, GradingClient};
use crate::error::{GenerationError, GradingError, LookupError};

pub mod fixtures {
    use super::*;
    use serde_json::json;
    use shared_types::{AssetBundle, BlogOutlineBody};

    pub fn words(count: usize) -> String {
        vec!["word"; count].join(" ")
    }

    pub fn persona() -> Persona {
        Persona {
            id: Uuid::new_v4(),
            name: "Weekend gardener".into(),
            product: "Smart soil sensor".into(),
            audience: "Hobby gardeners with small raised beds".into(),
            attributes: json!({ "painPoints": ["overwatering"] }),
            created_at: Utc::now(),
        }
    }

    pub fn messaging(persona_id: AssetId) -> Messaging {
        Messaging {
            id: Uuid::new_v4(),
            persona_id,
            headline: "Know exactly when to water".into(),
            elevator_pitch: "A soil sensor that texts you before your plants get thirsty.".into(),
            viral_taglines: vec![
                "Your plants can text now".into(),
                "Stop guessing, start growing".into(),
                "Water less, harvest more".into(),
            ],
            created_at: Utc::now(),
        }
    }

    pub fn script(persona_id: AssetId, messaging_id: Option<AssetId>) -> Script {
        Script {
            id: Uuid::new_v4(),
            persona_id,
            messaging_id,
            platform: "reels".into(),
            sections: ScriptSections::new(words(15), words(70), words(15)),
            created_at: Utc::now(),
        }
    }

    pub fn blog_outline(persona_id: AssetId, messaging_id: Option<AssetId>) -> BlogOutline {
        BlogOutline {
            id: Uuid::new_v4(),
            persona_id,
            messaging_id,
            title: "Raised bed watering, solved".into(),
            outline: BlogOutlineBody {
                meta_description: Some("How a soil sensor ends overwatering for good.".into()),
                sections: (0..7).map(|i| json!({ "heading": format!("Step {}", i) })).collect(),
                seo_keywords: (0..7).map(|i| format!("soil sensor {}", i)).collect(),
                extra: Default::default(),
            },
            created_at: Utc::now(),
        }
    }

    /// Persona with linked messaging, script and outline that pass every
    /// hard check without warnings.
    pub fn consistent_bundle() -> AssetBundle {
        let persona = persona();
        let messaging = messaging(persona.id);
        let script = script(persona.id, Some(messaging.id));
        let outline = blog_outline(persona.id, Some(messaging.id));
        AssetBundle {
            persona: Some(persona),
            messaging: Some(messaging),
            script: Some(script),
            blog_outline: Some(outline),
        }
    }
}

#[derive(Default)]
pub struct InMemoryAssets {
    personas: Mutex<HashMap<AssetId, Persona>>,
    messagings: Mutex<HashMap<AssetId, Messaging>>,
    scripts: Mutex<HashMap<AssetId, Script>>,
    blog_outlines: Mutex<HashMap<AssetId, BlogOutline>>,
    broken: bool,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every lookup fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn insert_persona(&self, persona: Persona) {
        self.personas.lock().unwrap().insert(persona.id, persona);
    }

    pub fn insert_messaging(&self, messaging: Messaging) {
        self.messagings.lock().unwrap().insert(messaging.id, messaging);
    }

    pub fn insert_script(&self, script: Script) {
        self.scripts.lock().unwrap().insert(script.id, script);
    }

    pub fn insert_blog_outline(&self, outline: BlogOutline) {
        self.blog_outlines.lock().unwrap().insert(outline.id, outline);
    }

    pub fn messaging_count(&self) -> usize {
        self.messagings.lock().unwrap().len()
    }

    pub fn script_count(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), LookupError> {
        if self.broken {
            Err(LookupError::Storage("database is locked".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AssetLookup for InMemoryAssets {
    async fn persona(&self, id: AssetId) -> Result<Option<Persona>, LookupError> {
        self.check()?;
        Ok(self.personas.lock().unwrap().get(&id).cloned())
    }

    async fn messaging(&self, id: AssetId) -> Result<Option<Messaging>, LookupError> {
        self.check()?;
        Ok(self.messagings.lock().unwrap().get(&id).cloned())
    }

    async fn script(&self, id: AssetId) -> Result<Option<Script>, LookupError> {
        self.check()?;
        Ok(self.scripts.lock().unwrap().get(&id).cloned())
    }

    async fn blog_outline(&self, id: AssetId) -> Result<Option<BlogOutline>, LookupError> {
        self.check()?;
        Ok(self.blog_outlines.lock().unwrap().get(&id).cloned())
    }
}

/// Grader that replays a fixed list of responses.
pub struct ScriptedGrader {
    responses: Mutex<VecDeque<Result<String, GradingError>>>,
    calls: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedGrader {
    pub fn new(responses: Vec<Result<String, GradingError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GradingClient for ScriptedGrader {
    async fn complete_json(&self, _system: &str, _user: &str) -> Result<String, GradingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GradingError::Transport("no scripted response".into())))
    }
}

type GradeFn = dyn Fn(&str) -> Result<String, GradingError> + Send + Sync;

/// Grader whose answer is a pure function of the prompt.
pub struct FnGrader {
    grade: Box<GradeFn>,
    calls: AtomicU32,
}

impl FnGrader {
    pub fn new(grade: impl Fn(&str) -> Result<String, GradingError> + Send + Sync + 'static) -> Self {
        Self {
            grade: Box::new(grade),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GradingClient for FnGrader {
    async fn complete_json(&self, _system: &str, user: &str) -> Result<String, GradingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.grade)(user)
    }
}

/// Headline given to every regenerated messaging.
pub const REGENERATED_HEADLINE: &str = "Regenerated: water on schedule";

/// Generator that writes fresh records into an [`InMemoryAssets`] store and
/// logs every call in order.
pub struct FakeGenerator {
    store: Arc<InMemoryAssets>,
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeGenerator {
    pub fn new(store: Arc<InMemoryAssets>) -> Self {
        Self {
            store,
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(store: Arc<InMemoryAssets>) -> Self {
        Self {
            fail: true,
            ..Self::new(store)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn regenerate_messaging(&self, persona_id: AssetId) -> Result<Messaging, GenerationError> {
        self.calls.lock().unwrap().push("messaging".into());
        if self.fail {
            return Err(GenerationError::Provider("model overloaded".into()));
        }
        let mut messaging = fixtures::messaging(persona_id);
        messaging.headline = REGENERATED_HEADLINE.into();
        self.store.insert_messaging(messaging.clone());
        Ok(messaging)
    }

    async fn regenerate_script(
        &self,
        persona_id: AssetId,
        messaging_id: AssetId,
        platform_hint: &str,
    ) -> Result<Script, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("script:{}:{}", messaging_id, platform_hint));
        if self.fail {
            return Err(GenerationError::Provider("model overloaded".into()));
        }
        let mut script = fixtures::script(persona_id, Some(messaging_id));
        script.platform = platform_hint.to_string();
        self.store.insert_script(script.clone());
        Ok(script)
    }
}
