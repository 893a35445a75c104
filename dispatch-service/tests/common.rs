use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
    time::Duration,
};

use dispatch_service::{
    clients::{
        memory::{
            InMemoryDirectory, InMemoryJobStore, InMemoryOutcomeStore, InMemorySettingsStore,
            InMemoryTemplateCatalog,
        },
        messaging::MessagingClient,
    },
    dispatcher::{BatchDispatcher, Collaborators, DispatchOptions},
    models::{
        context::{BatchRequest, EndpointSettings, PolicyUrls},
        recipient::Recipient,
        template::NotificationTemplate,
    },
};

use tracing::subscriber::DefaultGuard;

pub const TEMPLATE_KEY: &str = "QuestionnaireDue";
pub const ENDPOINT_KEY: &str = "default";
pub const POLICY_KEY: &str = "default";
pub const SEND_PATH: &str = "/messaging/email/us/pspb";

pub fn template() -> NotificationTemplate {
    NotificationTemplate {
        developer_name: TEMPLATE_KEY.to_string(),
        subject: "Your questionnaire is due".to_string(),
        body_template: "Questionnaire Due".to_string(),
        body_template_id: "tmpl-42".to_string(),
        event_name: "QuestionnaireDue".to_string(),
        event_type: "Email".to_string(),
    }
}

pub fn policy_urls() -> PolicyUrls {
    PolicyUrls {
        unsubscribe: "https://example.com/unsubscribe".to_string(),
        terms_of_use: "https://example.com/terms".to_string(),
        privacy_notice: "https://example.com/privacy".to_string(),
    }
}

pub fn endpoint(base_url: &str) -> EndpointSettings {
    EndpointSettings {
        base_path: format!("{}/messaging", base_url),
        channel_id: "email".to_string(),
        country: "us".to_string(),
        config_item: "pspb".to_string(),
    }
}

pub fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new(vec![
        Recipient::new("A", "Ada", "ada@example.com"),
        Recipient::new("B", "Bob", "bob@example.com"),
        Recipient::new("C", "Cy", "cy@example.com"),
        Recipient::new("D", "Di", "di@example.com"),
        Recipient::new("E", "Ed", "ed@example.com"),
    ])
}

pub fn request(contact_ids: &[&str]) -> BatchRequest {
    BatchRequest {
        contact_ids: contact_ids.iter().map(|id| id.to_string()).collect(),
        template_key: TEMPLATE_KEY.to_string(),
        destination_url: "https://portal.example.com/login".to_string(),
        ..Default::default()
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub struct Harness {
    pub dispatcher: BatchDispatcher,
    pub directory: Arc<InMemoryDirectory>,
    pub outcomes: Arc<InMemoryOutcomeStore>,
    pub jobs: Arc<InMemoryJobStore>,
}

pub fn harness(provider_url: &str, chunk_size: usize) -> Harness {
    harness_with_store(provider_url, chunk_size, InMemoryOutcomeStore::new())
}

pub fn harness_with_store(
    provider_url: &str,
    chunk_size: usize,
    store: InMemoryOutcomeStore,
) -> Harness {
    let directory = Arc::new(directory());
    let outcomes = Arc::new(store);
    let jobs = Arc::new(InMemoryJobStore::new());

    let settings = InMemorySettingsStore::new()
        .with_endpoint(ENDPOINT_KEY, endpoint(provider_url))
        .with_policy_urls(POLICY_KEY, policy_urls());

    let collaborators = Collaborators {
        directory: directory.clone(),
        templates: Arc::new(InMemoryTemplateCatalog::new(vec![template()])),
        settings: Arc::new(settings),
        outcomes: outcomes.clone(),
        jobs: jobs.clone(),
    };

    let messaging = MessagingClient::with_timeout(Duration::from_secs(5))
        .expect("messaging client builds");

    let dispatcher = BatchDispatcher::new(
        collaborators,
        messaging,
        DispatchOptions {
            chunk_size,
            default_endpoint_key: ENDPOINT_KEY.to_string(),
            default_policy_key: POLICY_KEY.to_string(),
        },
    );

    Harness {
        dispatcher,
        directory,
        outcomes,
        jobs,
    }
}

/// Log lines written while the returned guard is alive on this thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
            .unwrap_or_default()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}
