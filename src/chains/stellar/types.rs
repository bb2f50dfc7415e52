use crate::chains::stellar::errors::{StellarError, StellarResult};
use serde::{Deserialize, Serialize};
use stellar_strkey::ed25519::PublicKey as StrkeyPublicKey;

/// Asset a balance line is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "asset_type", rename_all = "snake_case")]
pub enum AssetId {
    Native,
    Issued {
        kind: String,
        code: String,
        issuer: String,
    },
    LiquidityPoolShares {
        pool_id: String,
    },
    /// Balance line of a type this service does not know. Kept as-is.
    Unrecognized {
        kind: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: AssetId,
    /// Decimal string exactly as Horizon reported it.
    pub balance: String,
}

/// Point-in-time view of a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: String,
    pub sequence: i64,
    pub balances: Vec<AssetBalance>,
}

impl AccountSnapshot {
    /// Returns the native balance. A funded account carries exactly one native
    /// line; zero or several means Horizon returned something we cannot trust.
    pub fn native_balance(&self) -> StellarResult<&str> {
        let mut native = self
            .balances
            .iter()
            .filter(|b| matches!(b.asset, AssetId::Native));

        match (native.next(), native.next()) {
            (Some(line), None) => Ok(line.balance.as_str()),
            (None, _) => Err(StellarError::serialization_error(format!(
                "account {} has no native balance entry",
                self.address
            ))),
            (Some(_), Some(_)) => Err(StellarError::serialization_error(format!(
                "account {} has more than one native balance entry",
                self.address
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonAccount {
    pub account_id: String,
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<HorizonBalance>,
    #[serde(default)]
    pub subentry_count: u32,
    #[serde(default)]
    pub last_modified_ledger: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonBalance {
    pub asset_type: String,
    pub asset_code: Option<String>,
    pub asset_issuer: Option<String>,
    pub liquidity_pool_id: Option<String>,
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub horizon_url: String,
    pub response_time_ms: u64,
    pub last_check: String,
    pub error_message: Option<String>,
}

impl TryFrom<HorizonAccount> for AccountSnapshot {
    type Error = StellarError;

    fn try_from(account: HorizonAccount) -> StellarResult<Self> {
        let sequence = account.sequence.parse::<i64>().map_err(|_| {
            StellarError::serialization_error(format!(
                "invalid sequence number '{}' for account {}",
                account.sequence, account.account_id
            ))
        })?;

        let balances = account
            .balances
            .into_iter()
            .map(AssetBalance::try_from)
            .collect::<StellarResult<Vec<_>>>()?;

        Ok(Self {
            address: account.account_id,
            sequence,
            balances,
        })
    }
}

impl TryFrom<HorizonBalance> for AssetBalance {
    type Error = StellarError;

    fn try_from(line: HorizonBalance) -> StellarResult<Self> {
        let asset = match line.asset_type.as_str() {
            "native" => AssetId::Native,
            "credit_alphanum4" | "credit_alphanum12" => AssetId::Issued {
                code: line.asset_code.ok_or_else(|| {
                    StellarError::serialization_error("issued balance without asset_code")
                })?,
                issuer: line.asset_issuer.ok_or_else(|| {
                    StellarError::serialization_error("issued balance without asset_issuer")
                })?,
                kind: line.asset_type.clone(),
            },
            "liquidity_pool_shares" => AssetId::LiquidityPoolShares {
                pool_id: line.liquidity_pool_id.unwrap_or_default(),
            },
            _ => AssetId::Unrecognized {
                kind: line.asset_type.clone(),
            },
        };

        Ok(Self {
            asset,
            balance: line.balance,
        })
    }
}

pub fn is_valid_stellar_address(address: &str) -> bool {
    if address.len() != 56 || !address.starts_with('G') {
        return false;
    }

    StrkeyPublicKey::from_string(address).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(balance: &str) -> AssetBalance {
        AssetBalance {
            asset: AssetId::Native,
            balance: balance.to_string(),
        }
    }

    #[test]
    fn test_horizon_account_conversion_keeps_balance_text() {
        let raw = r#"{
            "account_id": "GCJRI5CIWK5IU67Q6DGA7QW52JDKRO7JEAHQKFNDUJUPEZGURDBX3LDX",
            "sequence": "4113023257149440",
            "subentry_count": 1,
            "balances": [
                {
                    "balance": "12.5000000",
                    "asset_type": "credit_alphanum4",
                    "asset_code": "USDC",
                    "asset_issuer": "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN"
                },
                { "balance": "9999.9999900", "asset_type": "native" }
            ]
        }"#;

        let account: HorizonAccount = serde_json::from_str(raw).unwrap();
        let snapshot = AccountSnapshot::try_from(account).unwrap();

        assert_eq!(snapshot.sequence, 4113023257149440);
        assert_eq!(snapshot.balances.len(), 2);
        assert_eq!(snapshot.native_balance().unwrap(), "9999.9999900");
    }

    #[test]
    fn test_unknown_asset_type_does_not_hide_native_balance() {
        let raw = r#"{
            "account_id": "GCJRI5CIWK5IU67Q6DGA7QW52JDKRO7JEAHQKFNDUJUPEZGURDBX3LDX",
            "sequence": "77",
            "balances": [
                { "balance": "3.0000000", "asset_type": "contract_token" },
                { "balance": "150.0000000", "asset_type": "native" }
            ]
        }"#;

        let account: HorizonAccount = serde_json::from_str(raw).unwrap();
        let snapshot = AccountSnapshot::try_from(account).unwrap();

        assert_eq!(
            snapshot.balances[0].asset,
            AssetId::Unrecognized {
                kind: "contract_token".to_string()
            }
        );
        assert_eq!(snapshot.native_balance().unwrap(), "150.0000000");
    }

    #[test]
    fn test_non_numeric_sequence_is_rejected() {
        let account = HorizonAccount {
            account_id: "GABC".to_string(),
            sequence: "not-a-number".to_string(),
            balances: vec![],
            subentry_count: 0,
            last_modified_ledger: None,
        };
        assert!(matches!(
            AccountSnapshot::try_from(account),
            Err(StellarError::SerializationError { .. })
        ));
    }

    #[test]
    fn test_native_balance_requires_exactly_one_entry() {
        let mut snapshot = AccountSnapshot {
            address: "GABC".to_string(),
            sequence: 1,
            balances: vec![],
        };
        assert!(snapshot.native_balance().is_err());

        snapshot.balances.push(native("1.0000000"));
        assert_eq!(snapshot.native_balance().unwrap(), "1.0000000");

        snapshot.balances.push(native("2.0000000"));
        assert!(snapshot.native_balance().is_err());
    }

    #[test]
    fn test_valid_stellar_address() {
        assert!(is_valid_stellar_address(
            "GCJRI5CIWK5IU67Q6DGA7QW52JDKRO7JEAHQKFNDUJUPEZGURDBX3LDX"
        ));
        assert!(!is_valid_stellar_address("INVALID_ADDRESS"));
        assert!(!is_valid_stellar_address(
            "GD5DJQDQKNR7DSXJVNJTV3P5JJH4KJVTI2JZNYUYIIKHTDNJQXECM4J"
        ));
    }
}
