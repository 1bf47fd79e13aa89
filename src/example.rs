//! Sample service configuration, used by the command-line front end.
use std::path::PathBuf;

use chrono::TimeDelta;

use crate::decl::{FieldDef, Record, RecordDef, TypeDecl};
use crate::error::BindError;
use crate::value::RecordValue;

/// Configuration for an example service.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    pub database_url: String,
    pub port: u16,
    pub request_timeout: TimeDelta,
    pub allowed_hosts: Vec<String>,
    pub tls: Option<TlsConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://<username>:<password>@<hostname>/<database name>"
                .to_owned(),
            port: 12345,
            request_timeout: TimeDelta::seconds(30),
            allowed_hosts: Vec::new(),
            tls: None,
        }
    }
}

impl Record for ServiceConfig {
    fn definition() -> RecordDef {
        RecordDef::new()
            .doc("Configuration for an example service.")
            .field(
                FieldDef::new("database_url", TypeDecl::String)
                    .doc("The URL of the database to connect to."),
            )
            .field(
                FieldDef::new("port", TypeDecl::Integer)
                    .default(12345_i64)
                    .doc("TCP port on which to accept connections."),
            )
            .field(
                FieldDef::new("request_timeout", TypeDecl::Duration)
                    .default(TimeDelta::seconds(30))
                    .doc("How long a request may take before it is aborted."),
            )
            .field(
                FieldDef::new("allowed_hosts", TypeDecl::list(TypeDecl::String))
                    .default(Vec::<String>::new())
                    .doc(
                        "Host names accepted in the Host header.

                        An empty list accepts any host.",
                    ),
            )
            .field(
                FieldDef::new("tls", TypeDecl::optional(TypeDecl::record::<TlsConfig>()))
                    .optional()
                    .doc("Serve HTTPS instead of plain HTTP."),
            )
    }

    fn from_record(mut record: RecordValue) -> Result<Self, BindError> {
        Ok(Self {
            database_url: record.take("database_url")?,
            port: record.take("port")?,
            request_timeout: record.take("request_timeout")?,
            allowed_hosts: record.take("allowed_hosts")?,
            tls: record.take("tls")?,
        })
    }

    fn to_record(&self) -> RecordValue {
        RecordValue::new::<Self>()
            .with("database_url", &self.database_url)
            .with("port", &self.port)
            .with("request_timeout", &self.request_timeout)
            .with("allowed_hosts", &self.allowed_hosts)
            .with("tls", &self.tls)
    }
}

/// TLS key material.
#[derive(Clone, Debug, PartialEq)]
pub struct TlsConfig {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

impl Record for TlsConfig {
    fn definition() -> RecordDef {
        RecordDef::new()
            .doc("TLS key material.")
            .field(
                FieldDef::new("certificate", TypeDecl::Path).doc("PEM-encoded certificate chain."),
            )
            .field(FieldDef::new("private_key", TypeDecl::Path))
    }

    fn from_record(mut record: RecordValue) -> Result<Self, BindError> {
        Ok(Self {
            certificate: record.take("certificate")?,
            private_key: record.take("private_key")?,
        })
    }

    fn to_record(&self) -> RecordValue {
        RecordValue::new::<Self>()
            .with("certificate", &self.certificate)
            .with("private_key", &self.private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Binder;

    #[test]
    fn defaults_apply_to_a_minimal_document() {
        let binder = Binder::<ServiceConfig>::new().unwrap();
        let config = binder.parse_str("database-url = 'sqlite://'").unwrap();
        assert_eq!(config.port, 12345);
        assert_eq!(config.request_timeout, TimeDelta::seconds(30));
        assert_eq!(config.tls, None);
    }

    #[test]
    fn nested_tls_table_binds() {
        let binder = Binder::<ServiceConfig>::new().unwrap();
        let config = binder
            .parse_str(
                "database-url = 'sqlite://'\n\
                 request-timeout-minutes = 2\n\
                 [tls]\n\
                 certificate = 'certs/server.pem'\n\
                 private-key = 'certs/server.key'\n",
            )
            .unwrap();
        assert_eq!(config.request_timeout, TimeDelta::minutes(2));
        let tls = config.tls.unwrap();
        assert_eq!(tls.private_key, PathBuf::from("certs/server.key"));
    }

    #[test]
    fn template_documents_every_field() {
        let text = Binder::<ServiceConfig>::new()
            .unwrap()
            .format_toml_template()
            .to_text()
            .unwrap();
        assert_eq!(
            text,
            "\
# The URL of the database to connect to.
# Mandatory.
database-url = '???'

# TCP port on which to accept connections.
# Default:
# port = 12345

# How long a request may take before it is aborted.
# Default:
# request-timeout = 00:00:30

# Host names accepted in the Host header.
#
# An empty list accepts any host.
#
# Default:
# allowed-hosts = []

# TLS key material.
# Serve HTTPS instead of plain HTTP.
# Optional table.
[tls]

# PEM-encoded certificate chain.
# Mandatory.
certificate = '/path/to/dir_or_file'

# Mandatory.
private-key = '/path/to/dir_or_file'"
        );
    }
}
