//! Unit tests for the Metal3Data reconciler

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::metrics::{Metrics, Outcome};
    use crate::reconciler::Reconciler;
    use crate::test_utils::*;
    use crds::*;
    use std::sync::Arc;
    use std::time::Duration;
    use store_client::{MockStoreClient, StoreError};

    const REQUEUE: Duration = Duration::from_secs(30);

    fn reconciler(store: &MockStoreClient) -> (Reconciler, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let reconciler = Reconciler::new(Arc::new(store.clone()), REQUEUE, Arc::clone(&metrics));
        (reconciler, metrics)
    }

    fn stored(store: &MockStoreClient) -> Metal3Data {
        store.data(NAMESPACE, DATA_NAME).unwrap()
    }

    fn allocated_store(template: Metal3DataTemplate) -> MockStoreClient {
        let store = create_test_store(template);
        store.add_data(create_test_data(0));
        store.add_ip_claim(create_allocated_ip_claim("pool1", Some("pool1-address")));
        store.add_ip_address(create_test_ip_address("pool1-address", "192.168.0.14", 24, None, &[]));
        store
    }

    #[tokio::test]
    async fn test_live_data_becomes_ready() {
        let store = allocated_store(create_test_template(Some(simple_meta_data()), Some(simple_network_data("pool1"))));
        let (reconciler, metrics) = reconciler(&store);

        reconciler.reconcile_data(&stored(&store)).await.unwrap();

        let data = stored(&store);
        assert_eq!(data.metadata.finalizers, Some(vec![DATA_FINALIZER.to_string()]));
        let status = data.status.unwrap();
        assert!(status.ready);
        assert!(status.last_updated.is_some());
        assert_eq!(store.secret_count(), 2);
        assert_eq!(metrics.count(Outcome::Ready), 1);
    }

    #[tokio::test]
    async fn test_unchanged_status_is_not_written() {
        let store = allocated_store(create_test_template(Some(simple_meta_data()), None));
        let (reconciler, _) = reconciler(&store);
        reconciler.reconcile_data(&stored(&store)).await.unwrap();
        let version = stored(&store).metadata.resource_version;

        reconciler.reconcile_data(&stored(&store)).await.unwrap();

        assert_eq!(stored(&store).metadata.resource_version, version);
    }

    #[tokio::test]
    async fn test_pending_claims_persist_finalizer_first() {
        let store = create_test_store(create_test_template(None, Some(simple_network_data("pool1"))));
        store.add_data(create_test_data(0));
        let (reconciler, metrics) = reconciler(&store);

        let err = reconciler.reconcile_data(&stored(&store)).await.unwrap_err();

        assert_eq!(err.requeue_after(), Some(REQUEUE));
        assert_eq!(reconciler.retry_delay(&stored(&store), &err), REQUEUE);
        assert!(stored(&store).metadata.finalizers.is_some());
        assert_eq!(store.ip_claim_count(), 1);
        assert_eq!(metrics.count(Outcome::Requeue), 1);
    }

    #[tokio::test]
    async fn test_hard_error_is_persisted() {
        let store = create_test_store(create_test_template(Some(simple_meta_data()), None));
        store.add_data_claim(create_test_data_claim(false));
        store.add_data(create_test_data(0));
        let (reconciler, metrics) = reconciler(&store);

        let err = reconciler.reconcile_data(&stored(&store)).await.unwrap_err();

        assert!(matches!(err, ControllerError::Ownership(_)));
        let status = stored(&store).status.unwrap();
        assert!(status.error_message.unwrap().contains("no Metal3Machine owner"));
        assert_eq!(reconciler.retry_delay(&stored(&store), &err), Duration::from_secs(60));
        assert_eq!(metrics.count(Outcome::Error), 1);
    }

    #[tokio::test]
    async fn test_stale_object_conflicts() {
        let store = allocated_store(create_test_template(Some(simple_meta_data()), None));
        let (reconciler, _) = reconciler(&store);
        let mut stale = stored(&store);
        stale.metadata.resource_version = Some("0".to_string());

        let err = reconciler.reconcile_data(&stale).await.unwrap_err();

        assert!(matches!(err, ControllerError::Store(StoreError::Conflict(_))));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_delete_releases_claims_then_finalizer() {
        let store = allocated_store(create_test_template(None, Some(simple_network_data("pool1"))));
        let mut data = create_test_data(0);
        data.metadata.finalizers = Some(vec![DATA_FINALIZER.to_string()]);
        data.metadata.deletion_timestamp = Some(deletion_time());
        store.add_data(data);
        let (reconciler, metrics) = reconciler(&store);

        reconciler.reconcile_data(&stored(&store)).await.unwrap();

        assert_eq!(store.ip_claim_count(), 0);
        assert!(store.data(NAMESPACE, DATA_NAME).is_none());
        assert_eq!(metrics.count(Outcome::Deleted), 1);
    }

    #[tokio::test]
    async fn test_failed_release_keeps_data_finalizer() {
        let store = allocated_store(create_test_template(None, Some(simple_network_data("pool1"))));
        let mut data = create_test_data(0);
        data.metadata.finalizers = Some(vec![DATA_FINALIZER.to_string()]);
        data.metadata.deletion_timestamp = Some(deletion_time());
        store.add_data(data);
        store.set_fail_deletes(true);
        let (reconciler, _) = reconciler(&store);

        assert!(reconciler.reconcile_data(&stored(&store)).await.is_err());

        let data = stored(&store);
        assert_eq!(data.metadata.finalizers, Some(vec![DATA_FINALIZER.to_string()]));
    }
}
