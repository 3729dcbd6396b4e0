//! Single import point for embedding the help-desk front end.

pub use helpdesk_app as app;
pub use helpdesk_config as config;
pub use helpdesk_domain as domain;
pub use helpdesk_eventbus as eventbus;
pub use helpdesk_gateway as gateway;
