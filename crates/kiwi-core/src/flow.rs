//! Deployment flow controller
//!
//! The whole session lives in [`Session`] and only changes through
//! [`reduce`]. User intent and gateway results both arrive as [`Action`]s; the
//! reducer answers with the [`Effect`]s (gateway calls) the runtime must
//! perform. Each effect's outcome comes back later as another action, so the
//! reducer itself never awaits anything.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::conversation::{pretty_print, AppId, Conversation, ConversationEntry};
use crate::gateway::{DeployResponse, DetectResponse};
use crate::selector::AppSelector;

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Kiwi Deployment Assistant. Please select an app to deploy from the list.";
pub const DETECT_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";
pub const DEPLOY_ERROR_MESSAGE: &str =
    "Sorry, there was an error deploying the app. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The app list became visible
    Mount,
    SelectApp(AppId),
    SubmitMessage(String),
    ConfirmDeploy,

    AppsLoaded(Vec<AppId>),
    AppsFailed(String),
    TemplateLoaded {
        app: AppId,
        template: Value,
    },
    TemplateFailed {
        app: AppId,
        error: String,
    },
    OptionsDetected {
        app: AppId,
        response: DetectResponse,
    },
    DetectFailed {
        app: AppId,
        error: String,
    },
    Deployed {
        app: AppId,
        options: Value,
        response: DeployResponse,
    },
    DeployFailed {
        app: AppId,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchApps,
    FetchTemplate(AppId),
    DetectOptions { app: AppId, message: String },
    Deploy { app: AppId, options: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoAppSelected,
    Idle,
    AwaitingDeployConfirmation,
}

/// Everything the flow knows, for the lifetime of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    selected_app: Option<AppId>,
    pending_deploy_options: Option<Value>,
    /// Index of the entry that carries `pending_deploy_options`
    pending_entry: Option<usize>,
    conversation: Conversation,
    selector: AppSelector,
    in_flight: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::assistant(WELCOME_MESSAGE));

        Self {
            selected_app: None,
            pending_deploy_options: None,
            pending_entry: None,
            conversation,
            selector: AppSelector::new(),
            in_flight: 0,
        }
    }

    pub fn selected_app(&self) -> Option<&AppId> {
        self.selected_app.as_ref()
    }

    pub fn pending_deploy_options(&self) -> Option<&Value> {
        self.pending_deploy_options.as_ref()
    }

    pub fn pending_entry(&self) -> Option<usize> {
        self.pending_entry
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn selector(&self) -> &AppSelector {
        &self.selector
    }

    /// Number of gateway calls issued but not yet answered
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn phase(&self) -> Phase {
        match (&self.selected_app, &self.pending_deploy_options) {
            (None, _) => Phase::NoAppSelected,
            (Some(_), Some(_)) => Phase::AwaitingDeployConfirmation,
            (Some(_), None) => Phase::Idle,
        }
    }

    /// Message input is only open once an app is selected
    pub fn can_submit(&self) -> bool {
        self.selected_app.is_some()
    }

    pub fn can_deploy(&self) -> bool {
        self.selected_app.is_some() && self.pending_deploy_options.is_some()
    }

    /// Whether the deploy control on entry `index` is live
    pub fn is_deploy_ready(&self, index: usize) -> bool {
        self.can_deploy() && self.pending_entry == Some(index)
    }

    fn start(&mut self, effect: Effect) -> Vec<Effect> {
        self.in_flight += 1;
        vec![effect]
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

/// `null` carries nothing to deploy
fn has_options(options: &Value) -> bool {
    !options.is_null()
}

/// Apply one action to the session and return the gateway calls it requires
pub fn reduce(session: &mut Session, action: Action) -> Vec<Effect> {
    match action {
        Action::Mount => {
            if session.selector.mount() {
                session.start(Effect::FetchApps)
            } else {
                Vec::new()
            }
        }

        Action::SelectApp(app) => {
            debug!(app = %app, "app selected");
            session.selected_app = Some(app.clone());
            session.start(Effect::FetchTemplate(app))
        }

        Action::SubmitMessage(text) => {
            if text.trim().is_empty() {
                return Vec::new();
            }
            let Some(app) = session.selected_app.clone() else {
                debug!("message ignored: no app selected");
                return Vec::new();
            };

            // Shown before the gateway answers
            session.conversation.push(ConversationEntry::user(text.clone()));
            session.start(Effect::DetectOptions { app, message: text })
        }

        Action::ConfirmDeploy => {
            let (Some(app), Some(options)) = (
                session.selected_app.clone(),
                session.pending_deploy_options.clone(),
            ) else {
                debug!("deploy ignored: nothing pending");
                return Vec::new();
            };

            info!(app = %app, "deploying");
            session.start(Effect::Deploy { app, options })
        }

        Action::AppsLoaded(apps) => {
            session.finish();
            info!(count = apps.len(), "apps loaded");
            session.selector.set_apps(apps);
            Vec::new()
        }

        Action::AppsFailed(error) => {
            session.finish();
            warn!(%error, "error fetching apps");
            session.selector.set_apps(Vec::new());
            Vec::new()
        }

        Action::TemplateLoaded { app, template } => {
            session.finish();
            session.conversation.push(
                ConversationEntry::assistant(format!("Here's the template for {}:", app))
                    .with_code(pretty_print(&template)),
            );
            Vec::new()
        }

        Action::TemplateFailed { app, error } => {
            session.finish();
            warn!(app = %app, %error, "error fetching app template");
            Vec::new()
        }

        Action::OptionsDetected { app, response } => {
            session.finish();
            let DetectResponse { message, options } = response;
            debug!(app = %app, "deploy options detected");

            if has_options(&options) {
                let entry = ConversationEntry::assistant(message)
                    .with_code(pretty_print(&options))
                    .with_deploy_options(options.clone());
                let index = session.conversation.push(entry);
                session.pending_deploy_options = Some(options);
                session.pending_entry = Some(index);
            } else {
                session.conversation.push(ConversationEntry::assistant(message));
                session.pending_deploy_options = None;
                session.pending_entry = None;
            }
            Vec::new()
        }

        Action::DetectFailed { app, error } => {
            session.finish();
            warn!(app = %app, %error, "error detecting deployment options");
            session
                .conversation
                .push(ConversationEntry::assistant(DETECT_ERROR_MESSAGE));
            Vec::new()
        }

        Action::Deployed {
            app,
            options,
            response,
        } => {
            session.finish();
            info!(app = %app, "deploy finished");
            session
                .conversation
                .push(ConversationEntry::assistant(response.message));

            // A newer detect may have replaced the options while this ran
            if session.pending_deploy_options.as_ref() == Some(&options) {
                session.pending_deploy_options = None;
                session.pending_entry = None;
            }
            Vec::new()
        }

        Action::DeployFailed { app, error } => {
            session.finish();
            warn!(app = %app, %error, "error deploying app");
            session
                .conversation
                .push(ConversationEntry::assistant(DEPLOY_ERROR_MESSAGE));
            Vec::new()
        }
    }
}
