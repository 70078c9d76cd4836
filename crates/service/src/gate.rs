//! Per-capability concurrency gates

use relay_types::Capability;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// One semaphore per capability bounding in-flight upstream calls
///
/// Callers wait for a permit; there is no queue limit and no rejection.
#[derive(Debug, Clone)]
pub struct CapabilityGates {
	gates: HashMap<Capability, Arc<Semaphore>>,
	limits: HashMap<Capability, usize>,
}

impl CapabilityGates {
	/// Build gates with `permits_for` deciding each capability's budget
	pub fn new<F>(permits_for: F) -> Self
	where
		F: Fn(Capability) -> usize,
	{
		let mut gates = HashMap::new();
		let mut limits = HashMap::new();
		for capability in Capability::ALL {
			let permits = permits_for(capability).max(1);
			gates.insert(capability, Arc::new(Semaphore::new(permits)));
			limits.insert(capability, permits);
		}
		Self { gates, limits }
	}

	/// Same budget for every capability
	pub fn uniform(permits: usize) -> Self {
		Self::new(|_| permits)
	}

	/// Wait for a permit; it is released when dropped
	pub async fn acquire(&self, capability: Capability) -> Result<OwnedSemaphorePermit, AcquireError> {
		let gate = match self.gates.get(&capability) {
			Some(gate) => Arc::clone(gate),
			// Every capability gets a gate in `new`
			None => Arc::new(Semaphore::new(1)),
		};
		if gate.available_permits() == 0 {
			debug!("Waiting for a {} permit", capability);
		}
		gate.acquire_owned().await
	}

	pub fn limit(&self, capability: Capability) -> usize {
		self.limits.get(&capability).copied().unwrap_or(1)
	}

	pub fn available(&self, capability: Capability) -> usize {
		self.gates
			.get(&capability)
			.map(|gate| gate.available_permits())
			.unwrap_or(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_permits_are_per_capability() {
		let gates = CapabilityGates::new(|capability| match capability {
			Capability::TransformImage => 1,
			_ => 4,
		});

		let held = gates.acquire(Capability::TransformImage).await.unwrap();
		assert_eq!(gates.available(Capability::TransformImage), 0);
		assert_eq!(gates.available(Capability::Translate), 4);

		drop(held);
		assert_eq!(gates.available(Capability::TransformImage), 1);
		assert_eq!(gates.limit(Capability::Translate), 4);
	}

	#[tokio::test]
	async fn test_zero_is_clamped_to_one() {
		let gates = CapabilityGates::uniform(0);
		assert_eq!(gates.limit(Capability::SearchCatalog), 1);
		let _permit = gates.acquire(Capability::SearchCatalog).await.unwrap();
	}

	#[tokio::test]
	async fn test_waiter_proceeds_after_release() {
		let gates = CapabilityGates::uniform(1);
		let first = gates.acquire(Capability::Translate).await.unwrap();

		let waiter = {
			let gates = gates.clone();
			tokio::spawn(async move { gates.acquire(Capability::Translate).await.map(|_| ()) })
		};
		tokio::task::yield_now().await;
		assert!(!waiter.is_finished());

		drop(first);
		waiter.await.unwrap().unwrap();
	}
}
