use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::capabilities::InputCapabilities;
use crate::core::resource::{canonical_url, Resource};
use crate::error::InputError;

/// Minimal view of a captured DOM tree. Rule-specific DOM traversal is a
/// collaborator concern; the engine only needs to know a DOM was captured
/// and which document it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomDocument {
    pub document_url: String,
    pub node_count: u64,
}

/// One entry of the optional instrumentation timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub kind: String,
    pub start_millis: u64,
    pub duration_millis: u64,
}

/// Aggregate facts about a frozen input set, carried into every result set
/// so scoring stays reproducible from the record alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSummary {
    pub resource_count: u32,
    pub host_count: u32,
    pub total_response_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub primary_resource_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub onload_millis: Option<u64>,
}

/// The frozen snapshot a run analyzes: an ordered resource collection plus
/// optional DOM and timeline facets.
///
/// Mutable while being built; `freeze` is a one-way transition that builds
/// the derived indices and the summary. Every engine entry point requires a
/// frozen input, because the indices of an unfrozen set are not guaranteed
/// internally consistent.
pub struct InputSet {
    resources: Vec<Resource>,
    url_index: HashMap<String, usize>,
    host_index: BTreeMap<String, Vec<usize>>,
    dom: Option<DomDocument>,
    timeline: Option<Vec<TimelineEvent>>,
    primary_resource_url: Option<String>,
    onload_millis: Option<u64>,
    allow_duplicate_resources: bool,
    frozen: bool,
    summary: Option<InputSummary>,
}

impl Default for InputSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSet {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            url_index: HashMap::new(),
            host_index: BTreeMap::new(),
            dom: None,
            timeline: None,
            primary_resource_url: None,
            onload_millis: None,
            allow_duplicate_resources: false,
            frozen: false,
            summary: None,
        }
    }

    /// Permits resources that share a request URL. Only appropriate for
    /// serialization-only inputs; URL lookups return the first match.
    pub fn allow_duplicate_resources(&mut self) {
        self.allow_duplicate_resources = true;
    }

    /// Validates and appends a resource. Insertion order is preserved and
    /// significant: redirect ordering downstream derives from it.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), InputError> {
        if self.frozen {
            tracing::error!(
                url = resource.request_url(),
                "attempted to add a resource to a frozen input set"
            );
            return Err(InputError::Frozen);
        }
        if resource.request_url().is_empty() {
            return Err(InputError::EmptyUrl);
        }
        if resource.status_code() <= 0 {
            return Err(InputError::InvalidStatus(resource.status_code()));
        }
        let key = canonical_url(resource.request_url());
        if !self.allow_duplicate_resources && self.url_index.contains_key(&key) {
            return Err(InputError::DuplicateUrl(resource.request_url().to_string()));
        }

        let idx = self.resources.len();
        self.url_index.entry(key).or_insert(idx);
        let host = resource.host();
        if !host.is_empty() {
            self.host_index.entry(host).or_default().push(idx);
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn set_dom(&mut self, dom: DomDocument) -> Result<(), InputError> {
        self.check_mutable()?;
        self.dom = Some(dom);
        Ok(())
    }

    pub fn set_timeline(&mut self, events: Vec<TimelineEvent>) -> Result<(), InputError> {
        self.check_mutable()?;
        self.timeline = Some(events);
        Ok(())
    }

    pub fn set_primary_resource_url(&mut self, url: impl Into<String>) -> Result<(), InputError> {
        self.check_mutable()?;
        self.primary_resource_url = Some(url.into());
        Ok(())
    }

    pub fn set_onload_millis(&mut self, millis: u64) -> Result<(), InputError> {
        self.check_mutable()?;
        self.onload_millis = Some(millis);
        Ok(())
    }

    fn check_mutable(&self) -> Result<(), InputError> {
        if self.frozen {
            tracing::error!("attempted to mutate a frozen input set");
            return Err(InputError::Frozen);
        }
        Ok(())
    }

    /// One-way transition to the frozen state. Idempotent: a second freeze
    /// is a no-op.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.summary = Some(InputSummary {
            resource_count: self.resources.len() as u32,
            host_count: self.host_index.len() as u32,
            total_response_bytes: self.resources.iter().map(Resource::response_body_len).sum(),
            primary_resource_url: self.primary_resource_url.clone(),
            onload_millis: self.onload_millis,
        });
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The facets this input actually carries, used to decide which rules
    /// may run against it.
    pub fn available_capabilities(&self) -> InputCapabilities {
        let mut caps = InputCapabilities::NONE;
        if self.dom.is_some() {
            caps.add(InputCapabilities::DOM);
        }
        if self.onload_millis.is_some() {
            caps.add(InputCapabilities::ONLOAD);
        }
        if self.timeline.is_some() {
            caps.add(InputCapabilities::TIMELINE_DATA);
        }
        if !self.resources.is_empty() {
            if self.resources.iter().any(Resource::has_request_headers) {
                caps.add(InputCapabilities::REQUEST_HEADERS);
            }
            if self.resources.iter().all(|r| r.response_body().is_some()) {
                caps.add(InputCapabilities::RESPONSE_BODY);
            }
            if self.resources.iter().all(|r| r.request_start_millis().is_some()) {
                caps.add(InputCapabilities::REQUEST_START_TIMES);
            }
        }
        caps
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, idx: usize) -> &Resource {
        &self.resources[idx]
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Fragment-stripped URL lookup.
    pub fn resource_index_for_url(&self, url: &str) -> Option<usize> {
        self.url_index.get(&canonical_url(url)).copied()
    }

    pub fn resource_with_url(&self, url: &str) -> Option<&Resource> {
        self.resource_index_for_url(url).map(|idx| &self.resources[idx])
    }

    pub fn resources_on_host(&self, host: &str) -> &[usize] {
        self.host_index.get(host).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dom(&self) -> Option<&DomDocument> {
        self.dom.as_ref()
    }

    pub fn timeline(&self) -> Option<&[TimelineEvent]> {
        self.timeline.as_deref()
    }

    /// The page's primary resource: the explicitly declared one, falling
    /// back to the first resource added.
    pub fn primary_resource(&self) -> Option<&Resource> {
        if let Some(url) = &self.primary_resource_url {
            return self.resource_with_url(url);
        }
        self.resources.first()
    }

    /// Summary of the frozen input. Calling this before `freeze` is a
    /// caller bug.
    pub fn summary(&self) -> &InputSummary {
        self.summary
            .as_ref()
            .expect("InputSet::summary requires a frozen input set")
    }
}
