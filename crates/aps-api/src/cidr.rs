// IP/CIDR parameter handling.
//
// The appliance keys its per-host resources by the full CIDR form whenever a
// mask narrower than /32 is given, and by the bare address otherwise.
// `host_key` encodes that rule so the endpoint methods don't have to.

use std::net::Ipv4Addr;

use crate::error::Error;

/// An `ip` or `ip/prefix` parameter split into its parts.
///
/// A missing `/prefix` suffix parses as prefix length 0, the sentinel for
/// "no explicit mask". The raw input is kept verbatim because it doubles as
/// the resource identifier for masked addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpec {
    raw: String,
    address: String,
    prefix_len: i64,
}

impl AddressSpec {
    /// Split a raw parameter on the first `/`.
    ///
    /// Fails only if the portion after `/` is not an integer; address syntax
    /// and prefix range are checked separately by [`AddressSpec::validate`].
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let (address, prefix_len) = match raw.split_once('/') {
            Some((address, prefix)) => {
                let prefix_len: i64 = prefix.parse().map_err(|_| Error::InvalidInput {
                    message: format!("Parameter 'ip' failed validation: '{prefix}' is not an integer prefix length"),
                })?;
                (address.to_owned(), prefix_len)
            }
            None => (raw.to_owned(), 0),
        };

        Ok(Self {
            raw: raw.to_owned(),
            address,
            prefix_len,
        })
    }

    /// Check that the address part is a syntactically valid IPv4 address and
    /// the prefix length is within `[0, 32]`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.address.parse::<Ipv4Addr>().is_err() {
            return Err(Error::InvalidInput {
                message: format!("Parameter 'ip' failed validation: '{}' is not an IPv4 address", self.address),
            });
        }
        if !(0..=32).contains(&self.prefix_len) {
            return Err(Error::InvalidInput {
                message: format!("Parameter 'ip' failed validation: prefix length {} is out of range", self.prefix_len),
            });
        }
        Ok(())
    }

    /// Parse and validate in one step.
    pub fn validated(raw: &str) -> Result<Self, Error> {
        let spec = Self::parse(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    /// The identifier to use in per-host resource paths and `hostAddress`
    /// query parameters.
    ///
    /// A /32 mask means the bare address; any other prefix (including the
    /// no-mask sentinel 0, where raw and address coincide) means the original
    /// unparsed string.
    pub fn host_key(&self) -> &str {
        if self.prefix_len == 32 {
            &self.address
        } else {
            &self.raw
        }
    }

    /// The address part, without any mask.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The parsed prefix length (0 when no mask was given).
    pub fn prefix_len(&self) -> i64 {
        self.prefix_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_parses_with_sentinel_prefix() {
        let spec = AddressSpec::parse("10.1.2.3").expect("parse");
        assert_eq!(spec.address(), "10.1.2.3");
        assert_eq!(spec.prefix_len(), 0);
        assert_eq!(spec.host_key(), "10.1.2.3");
    }

    #[test]
    fn cidr_splits_into_address_and_prefix() {
        let spec = AddressSpec::parse("10.1.2.0/24").expect("parse");
        assert_eq!(spec.address(), "10.1.2.0");
        assert_eq!(spec.prefix_len(), 24);
    }

    #[test]
    fn non_integer_prefix_is_rejected() {
        let err = AddressSpec::parse("10.1.2.0/abc").expect_err("must fail");
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn masked_address_keeps_the_raw_form_as_key() {
        let spec = AddressSpec::validated("10.1.2.0/24").expect("validated");
        assert_eq!(spec.host_key(), "10.1.2.0/24");
    }

    #[test]
    fn slash_32_uses_the_bare_address_as_key() {
        let spec = AddressSpec::validated("10.1.2.3/32").expect("validated");
        assert_eq!(spec.host_key(), "10.1.2.3");
    }

    #[test]
    fn validate_rejects_bad_address_or_prefix() {
        assert!(AddressSpec::validated("not-an-ip").is_err());
        assert!(AddressSpec::validated("10.1.2.3/33").is_err());
        assert!(AddressSpec::validated("10.1.2.3/-1").is_err());
        assert!(AddressSpec::validated("10.1.2.3/0").is_ok());
    }
}
