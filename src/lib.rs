pub mod access {
    pub mod resolver;
}
pub mod config;
pub mod domain {
    pub mod access;
    pub mod course;
    pub mod enrollment;
    pub mod error;
    pub mod notification;
    pub mod payment;
}
pub mod enrollment {
    pub mod materializer;
}
pub mod gateway;
pub mod http {
    pub mod extract;
    pub mod handlers {
        pub mod courses;
        pub mod ops;
        pub mod payments;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod admin_auth;
        pub mod rate_limit;
    }
}
pub mod reconcile {
    pub mod engine;
    pub mod transition;
}
pub mod repo {
    pub mod courses_repo;
}
pub mod service {
    pub mod payment_service;
}
pub mod store;
pub mod webhook {
    pub mod payload;
    pub mod signature;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub verifier: webhook::signature::SignatureVerifier,
    pub redis_client: redis::Client,
}
