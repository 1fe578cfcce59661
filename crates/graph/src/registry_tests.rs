use super::*;
use crate::provider::ProviderResult;
use async_trait::async_trait;
use lc_core::ResourceKind;
use std::sync::atomic::{AtomicU8, Ordering};

struct FakeProvider {
    name: String,
    state: AtomicU8,
}

impl FakeProvider {
    fn new(name: &str) -> Self {
        FakeProvider { name: name.to_string(), state: AtomicU8::new(0) }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::SeqCst) {
            2 => LifecycleState::Running,
            1 => LifecycleState::Starting,
            _ => LifecycleState::Stopped,
        }
    }

    async fn start(&self) -> ProviderResult<()> {
        self.state.store(2, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> ProviderResult<()> {
        self.state.store(0, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn register_and_resolve_roundtrip() {
    let registry = Registry::new();
    let id = ResourceId::new(ResourceKind::Queue, "orders");
    let provider = Arc::new(FakeProvider::new("orders"));
    registry.register(id.clone(), provider, ResourceAttributes::default()).unwrap();

    assert_eq!(registry.len(), 1);
    let resolved = registry.resolve::<FakeProvider>(&id).unwrap();
    assert_eq!(resolved.name(), "orders");
}

#[test]
fn duplicate_registration_fails() {
    let registry = Registry::new();
    let id = ResourceId::new(ResourceKind::Queue, "orders");
    registry.register(id.clone(), Arc::new(FakeProvider::new("orders")), ResourceAttributes::default()).unwrap();
    let err = registry.register(id, Arc::new(FakeProvider::new("orders")), ResourceAttributes::default()).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateProvider(_)));
}

#[test]
fn deregister_removes_entry() {
    let registry = Registry::new();
    let id = ResourceId::new(ResourceKind::Queue, "orders");
    registry.register(id.clone(), Arc::new(FakeProvider::new("orders")), ResourceAttributes::default()).unwrap();
    assert!(registry.deregister(&id).is_some());
    assert!(registry.is_empty());
}
