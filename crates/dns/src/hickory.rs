use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::{
        rr::{Name, RecordType},
        ProtoErrorKind,
    },
    ResolveError, TokioResolver,
};
use tracing::warn;

use crate::probe::{DnsProbe, LookupError, RecordQuery};

/// [`DnsProbe`] backed by a hickory resolver.
pub struct HickoryProbe {
    resolver: TokioResolver,
}

impl HickoryProbe {
    /// Builds a probe from the host system DNS configuration.
    ///
    /// Falls back to hickory's default upstreams when the system
    /// configuration cannot be read.
    pub fn from_system(timeout: Duration) -> Self {
        match TokioResolver::builder_tokio() {
            Ok(mut builder) => {
                apply_options(builder.options_mut(), timeout);
                Self {
                    resolver: builder.build(),
                }
            }
            Err(err) => {
                warn!(stage = "dns", error = %err, "failed to load system DNS configuration, using defaults");
                Self::from_config(ResolverConfig::default(), timeout)
            }
        }
    }

    /// Builds an instance for an explicit resolver configuration.
    ///
    /// Each attempt is bounded by `timeout` and only one attempt is made per
    /// nameserver.
    pub fn from_config(config: ResolverConfig, timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        apply_options(&mut opts, timeout);
        let resolver = TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build();
        Self { resolver }
    }
}

fn apply_options(opts: &mut ResolverOpts, timeout: Duration) {
    opts.timeout = timeout;
    opts.attempts = 1;
}

/// Parses `host` as an absolute name so resolv.conf search domains are never appended.
fn absolute_name(host: &str) -> Result<Name, LookupError> {
    let mut name = Name::from_utf8(host)
        .map_err(|err| LookupError::Other(format!("invalid hostname {host}: {err}")))?;
    name.set_fqdn(true);
    Ok(name)
}

#[async_trait]
impl DnsProbe for HickoryProbe {
    async fn probe(&self, host: &str, query: RecordQuery) -> Result<(), LookupError> {
        let name = absolute_name(host)?;
        let found = match query {
            RecordQuery::A => self
                .resolver
                .ipv4_lookup(name)
                .await
                .map(|lookup| lookup.iter().next().is_some()),
            RecordQuery::Any => self
                .resolver
                .lookup(name, RecordType::ANY)
                .await
                .map(|lookup| lookup.record_iter().next().is_some()),
        }
        .map_err(|err| classify(&err))?;

        if found {
            Ok(())
        } else {
            Err(LookupError::NoAnswer)
        }
    }
}

fn classify(err: &ResolveError) -> LookupError {
    if err.is_nx_domain() {
        return LookupError::NxDomain;
    }
    if err.is_no_records_found() {
        return LookupError::NoAnswer;
    }
    if err
        .proto()
        .is_some_and(|proto| matches!(proto.kind(), ProtoErrorKind::Timeout))
    {
        return LookupError::Timeout;
    }
    LookupError::Other(err.to_string())
}
