//! End-to-end proxy scenarios: request in, remote call out, completion back

#[cfg(test)]
mod tests {
    use crate::config::ProxyConfig;
    use crate::memory::{CrudService, RESPONSE_ROOT};
    use crate::proxy::{
        Action, ActionHandler, Dispatch, ExceptionKind, HandlerRegistry, ProxyError, ProxyEvent,
        ProxyRequest, Record, RemoteCall, RemoteFunction, RequestHandler, RequestOutcome,
        RpcProxy, Transaction, Verdict,
    };
    use crate::reader::{DataReader, JsonReader};
    use serde_json::{json, Map, Value};
    use std::sync::{Arc, Mutex};

    /// Remote function that parks calls so the test can complete them later.
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<RemoteCall>>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<RemoteCall> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl RemoteFunction for Recorder {
        fn invoke(&self, call: RemoteCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    type Outcomes = Arc<Mutex<Vec<RequestOutcome>>>;

    fn collector() -> (Outcomes, impl Fn() -> Box<dyn FnOnce(RequestOutcome) + Send>) {
        let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
        let o = outcomes.clone();
        let make = move || {
            let o = o.clone();
            Box::new(move |outcome: RequestOutcome| o.lock().unwrap().push(outcome))
                as Box<dyn FnOnce(RequestOutcome) + Send>
        };
        (outcomes, make)
    }

    fn recorded_events(proxy: &RpcProxy) -> Arc<Mutex<Vec<ProxyEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        proxy.events().observe(move |e| sink.lock().unwrap().push(e.clone()));
        events
    }

    fn reader() -> Arc<dyn DataReader> {
        Arc::new(JsonReader::with_root("data"))
    }

    fn records(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().filter_map(Record::from_value).collect()
    }

    // === Scenario: read with no builder, completed by the remote ===
    #[test]
    fn read_scenario_round_trip() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Read, ActionHandler::new(remote.clone()))
                .build(),
        );
        let (outcomes, cb) = collector();

        let dispatch = proxy
            .do_request(Action::Read, vec![], Map::new(), reader(), cb(), json!(42))
            .unwrap();
        assert!(matches!(dispatch, Dispatch::Issued(_)));

        // Issued, not completed: the proxy does not wait.
        assert!(outcomes.lock().unwrap().is_empty());

        let mut calls = remote.take();
        assert_eq!(calls.len(), 1);
        let call = calls.remove(0);
        assert!(call.args.is_empty());
        assert_eq!(call.arity(), 1);

        call.completion
            .success(json!({"success": true, "data": [{"id": 1}]}));

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].options, json!(42));
        assert_eq!(outcomes[0].payloads(), vec![json!({"id": 1})]);
    }

    // === Scenario: completion handler always trails the arguments ===
    #[test]
    fn completion_trails_args_for_every_action() {
        let remote = Recorder::default();
        let builder_remote = Recorder::default();
        let registry = HandlerRegistry::builder()
            .handler(Action::Read, ActionHandler::new(remote.clone()))
            .handler(Action::Create, ActionHandler::new(remote.clone()))
            .handler(
                Action::Update,
                ActionHandler::new(builder_remote.clone()).with_args_builder(
                    |t: &Transaction, p: &[Value]| -> Option<Vec<Value>> {
                        Some(vec![json!(t.action().as_str()), json!(p.len()), json!(true)])
                    },
                ),
            )
            .handler(
                Action::Destroy,
                ActionHandler::new(builder_remote.clone()).with_args_builder(
                    |_t: &Transaction, _p: &[Value]| -> Option<Vec<Value>> { None },
                ),
            )
            .build();
        let proxy = RpcProxy::with_registry(registry);
        let (_outcomes, cb) = collector();
        let rows = || records(vec![json!({"id": 1}), json!({"id": 2})]);

        for action in Action::ALL {
            let recs = if action.is_write() { rows() } else { vec![] };
            proxy
                .request(ProxyRequest::new(action, reader(), cb()).records(recs))
                .unwrap();
        }

        let plain = remote.take();
        assert!(plain[0].args.is_empty());
        assert_eq!(plain[1].args, vec![json!([{"id": 1}, {"id": 2}])]);
        assert_eq!(plain[1].arity(), 2);

        let built = builder_remote.take();
        assert_eq!(built[0].args, vec![json!("update"), json!(2), json!(true)]);
        assert_eq!(built[0].arity(), 4);
        assert!(built[1].args.is_empty());
        assert_eq!(built[1].arity(), 1);
    }

    // === Scenario: unregistered action ===
    #[test]
    fn unregistered_action_raises_before_remote_call() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Read, ActionHandler::new(remote.clone()))
                .build(),
        );
        let (outcomes, cb) = collector();
        let err = proxy
            .do_request(Action::Update, records(vec![json!({"id": 1})]), Map::new(), reader(), cb(), Value::Null)
            .unwrap_err();

        assert!(matches!(err, ProxyError::NoHandler(Action::Update)));
        assert!(remote.take().is_empty());
        assert!(outcomes.lock().unwrap().is_empty());
    }

    // === Scenario: pre-flight veto ===
    #[test]
    fn veto_skips_remote_and_fails_synchronously() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Create, ActionHandler::new(remote.clone()))
                .build(),
        );
        proxy.events().subscribe(Arc::new(|e: &ProxyEvent| match e {
            ProxyEvent::BeforeWrite { records, .. } if records.len() > 1 => Verdict::Veto,
            _ => Verdict::Proceed,
        }));
        let (outcomes, cb) = collector();

        let dispatch = proxy
            .do_request(
                Action::Create,
                records(vec![json!({"a": 1}), json!({"a": 2})]),
                Map::new(),
                reader(),
                cb(),
                json!("opts"),
            )
            .unwrap();

        assert_eq!(dispatch, Dispatch::Vetoed);
        assert!(remote.take().is_empty());
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
        assert!(outcomes[0].data.is_none());
        assert_eq!(outcomes[0].options, json!("opts"));
    }

    // === Scenario: listeners that proceed let the request through ===
    #[test]
    fn before_load_sees_params_and_proceeds() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Read, ActionHandler::new(remote.clone()))
                .build(),
        );
        let events = recorded_events(&proxy);
        let (_outcomes, cb) = collector();
        let mut params = Map::new();
        params.insert("limit".into(), json!(20));

        proxy
            .do_request(Action::Read, vec![], params, reader(), cb(), Value::Null)
            .unwrap();

        assert_eq!(remote.take().len(), 1);
        match &events.lock().unwrap()[0] {
            ProxyEvent::BeforeLoad { params, .. } => assert_eq!(params["limit"], json!(20)),
            other => panic!("unexpected event {other:?}"),
        };
    }

    // === Scenario: transport failure on read ===
    #[test]
    fn read_transport_error_publishes_both_exceptions() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Read, ActionHandler::new(remote.clone()))
                .build(),
        );
        let events = recorded_events(&proxy);
        let (outcomes, cb) = collector();
        proxy
            .do_request(Action::Read, vec![], Map::new(), reader(), cb(), json!(7))
            .unwrap();

        let call = remote.take().remove(0);
        call.completion.error("boom", Some(json!({"name": "errObj"})));

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
        assert!(outcomes[0].data.is_none());
        assert_eq!(outcomes[0].options, json!(7));

        let events = events.lock().unwrap();
        let names: Vec<_> = events.iter().map(ProxyEvent::name).collect();
        if ProxyConfig::default().emits_legacy_load_exception() {
            assert_eq!(names, vec!["beforeload", "loadexception", "exception"]);
        } else {
            assert_eq!(names, vec!["beforeload", "exception"]);
        }
        assert_eq!(
            events.last().unwrap().exception_kind(),
            Some(ExceptionKind::RemoteTransport)
        );
    }

    // === Scenario: concurrent requests complete out of order ===
    #[test]
    fn concurrent_requests_keep_their_own_transactions() {
        let remote = Recorder::default();
        let proxy = RpcProxy::with_registry(
            HandlerRegistry::builder()
                .handler(Action::Read, ActionHandler::new(remote.clone()))
                .build(),
        );
        let (outcomes, cb) = collector();
        for n in 0..3 {
            proxy
                .do_request(Action::Read, vec![], Map::new(), reader(), cb(), json!(n))
                .unwrap();
        }

        let calls = remote.take();
        for (i, call) in calls.into_iter().enumerate().rev() {
            call.completion
                .success(json!({"data": [{"id": i}]}));
        }

        let outcomes = outcomes.lock().unwrap();
        let seen: Vec<(Value, Value)> = outcomes
            .iter()
            .map(|o| (o.options.clone(), o.payloads()[0]["id"].clone()))
            .collect();
        assert_eq!(
            seen,
            vec![(json!(2), json!(2)), (json!(1), json!(1)), (json!(0), json!(0))]
        );
    }

    // === Scenario: full CRUD cycle against the in-memory service ===
    #[tokio::test]
    async fn crud_cycle_against_memory_service() {
        let service = CrudService::new();
        let proxy = RpcProxy::new(service.registry(), ProxyConfig::default()).unwrap();
        let reader: Arc<dyn DataReader> = Arc::new(JsonReader::with_root(RESPONSE_ROOT));
        let events = recorded_events(&proxy);

        let read = proxy
            .execute(Action::Read, vec![], Map::new(), reader.clone(), Value::Null)
            .await
            .unwrap();
        assert!(read.success);
        assert_eq!(read.records().len(), 10);

        let created = proxy
            .execute(
                Action::Create,
                records(vec![json!({"firstName": "Ada", "lastName": "Lovelace"})]),
                Map::new(),
                reader.clone(),
                Value::Null,
            )
            .await
            .unwrap();
        assert!(created.success);
        let new_id = created.records()[0].id.clone().unwrap();
        assert_eq!(new_id, json!(10));

        let destroyed = proxy
            .execute(Action::Destroy, created.records().to_vec(), Map::new(), reader.clone(), Value::Null)
            .await
            .unwrap();
        assert!(destroyed.success);
        assert_eq!(service.len(), 10);

        let missing = proxy
            .execute(Action::Update, records(vec![json!({"id": 999})]), Map::new(), reader, Value::Null)
            .await
            .unwrap();
        assert!(!missing.success);
        assert!(missing.data.is_some());

        let kinds: Vec<_> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(ProxyEvent::exception_kind)
            .collect();
        assert_eq!(kinds, vec![ExceptionKind::RemoteRejection]);
    }
}
