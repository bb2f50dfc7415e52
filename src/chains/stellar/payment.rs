use crate::chains::stellar::config::StellarNetwork;
use crate::chains::stellar::errors::{StellarError, StellarResult};
use crate::chains::stellar::keys::AdminKeypair;
use crate::chains::stellar::types::AccountSnapshot;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use std::time::Duration;
use stellar_strkey::ed25519::{
    MuxedAccount as StrkeyMuxedAccount, PublicKey as StrkeyPublicKey,
};
use stellar_xdr::next::{
    Asset, DecoratedSignature, Hash, Limits, Memo, MuxedAccount, MuxedAccountMed25519, Operation,
    OperationBody, PaymentOp, Preconditions, SequenceNumber, Signature, TimeBounds, TimePoint,
    Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

const STROOPS_PER_UNIT: i64 = 10_000_000;
const MAX_DECIMALS: u32 = 7;

/// A validated request to move native currency out of the admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub destination: String,
    /// Amount as the caller wrote it.
    pub amount: String,
    pub amount_stroops: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    MissingField,
    InvalidAmount(String),
}

impl PaymentIntent {
    pub fn new(destination: &str, amount: &str) -> Result<Self, IntentError> {
        let destination = destination.trim();
        let amount = amount.trim();
        if destination.is_empty() || amount.is_empty() {
            return Err(IntentError::MissingField);
        }

        let amount_stroops = decimal_to_stroops(amount)?;

        Ok(Self {
            destination: destination.to_string(),
            amount: amount.to_string(),
            amount_stroops,
        })
    }
}

fn decimal_to_stroops(amount: &str) -> Result<i64, IntentError> {
    let value = Decimal::from_str(amount)
        .map_err(|_| IntentError::InvalidAmount(format!("'{}' is not a decimal number", amount)))?;

    if value <= Decimal::ZERO {
        return Err(IntentError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }

    if value.normalize().scale() > MAX_DECIMALS {
        return Err(IntentError::InvalidAmount(format!(
            "amount supports at most {} decimal places",
            MAX_DECIMALS
        )));
    }

    let stroops = value
        .checked_mul(Decimal::from(STROOPS_PER_UNIT))
        .and_then(|v| v.trunc().to_i64())
        .ok_or_else(|| IntentError::InvalidAmount("amount is too large".to_string()))?;

    Ok(stroops)
}

/// Unsigned native payment from the admin account. Built fresh for every
/// submission and never reused once signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEnvelope {
    pub source: String,
    pub sequence: i64,
    pub fee: u32,
    pub destination: String,
    pub amount: String,
    pub amount_stroops: i64,
    pub min_time: u64,
    pub max_time: u64,
}

impl PaymentEnvelope {
    /// Pure construction: sequence is `snapshot.sequence + 1` and the fee covers
    /// the single operation at `base_fee`.
    pub fn native_payment(
        snapshot: &AccountSnapshot,
        base_fee: u32,
        intent: &PaymentIntent,
        valid_for: Duration,
        now_unix: u64,
    ) -> StellarResult<Self> {
        let sequence = snapshot.sequence.checked_add(1).ok_or_else(|| {
            StellarError::serialization_error("account sequence number overflow")
        })?;

        // Reject destinations the network could never decode before anything is signed.
        parse_muxed_account(&intent.destination)?;

        Ok(Self {
            source: snapshot.address.clone(),
            sequence,
            fee: base_fee,
            destination: intent.destination.clone(),
            amount: intent.amount.clone(),
            amount_stroops: intent.amount_stroops,
            min_time: 0,
            max_time: now_unix.saturating_add(valid_for.as_secs()),
        })
    }

    pub fn to_transaction(&self) -> StellarResult<Transaction> {
        let op = Operation {
            source_account: None,
            body: OperationBody::Payment(PaymentOp {
                destination: parse_muxed_account(&self.destination)?,
                asset: Asset::Native,
                amount: self.amount_stroops,
            }),
        };

        Ok(Transaction {
            source_account: parse_muxed_account(&self.source)?,
            fee: self.fee,
            seq_num: SequenceNumber(self.sequence),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(self.min_time),
                max_time: TimePoint(self.max_time),
            }),
            memo: Memo::None,
            operations: VecM::try_from(vec![op])
                .map_err(|e| StellarError::serialization_error(e.to_string()))?,
            ext: TransactionExt::V0,
        })
    }

    /// Hash the network signs: sha256 of the signature payload bound to the
    /// network passphrase.
    pub fn hash(&self, network: StellarNetwork) -> StellarResult<[u8; 32]> {
        transaction_hash(self.to_transaction()?, network)
    }

    pub fn sign(self, keypair: &AdminKeypair, network: StellarNetwork) -> StellarResult<SignedEnvelope> {
        if keypair.public_address() != self.source {
            return Err(StellarError::signing_error(
                "signing key does not match envelope source account",
            ));
        }

        let tx = self.to_transaction()?;
        let hash = transaction_hash(tx.clone(), network)?;
        let signature = keypair.sign(&hash)?;

        let decorated = DecoratedSignature {
            hint: keypair.signature_hint(),
            signature: Signature::try_from(signature.to_vec())
                .map_err(|e| StellarError::serialization_error(e.to_string()))?,
        };

        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx,
            signatures: VecM::try_from(vec![decorated])
                .map_err(|e| StellarError::serialization_error(e.to_string()))?,
        });

        Ok(SignedEnvelope {
            payment: self,
            hash,
            signature,
            envelope,
        })
    }
}

/// A signed envelope ready for exactly one submission.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    pub payment: PaymentEnvelope,
    pub hash: [u8; 32],
    pub signature: [u8; 64],
    envelope: TransactionEnvelope,
}

impl SignedEnvelope {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn to_xdr_base64(&self) -> StellarResult<String> {
        self.envelope
            .to_xdr_base64(Limits::none())
            .map_err(|e| StellarError::serialization_error(e.to_string()))
    }
}

pub fn network_id(network: StellarNetwork) -> [u8; 32] {
    Sha256::digest(network.network_passphrase().as_bytes()).into()
}

fn transaction_hash(tx: Transaction, network: StellarNetwork) -> StellarResult<[u8; 32]> {
    let payload = TransactionSignaturePayload {
        network_id: Hash(network_id(network)),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx),
    };
    let bytes = payload
        .to_xdr(Limits::none())
        .map_err(|e| StellarError::serialization_error(e.to_string()))?;
    Ok(Sha256::digest(&bytes).into())
}

fn parse_muxed_account(address: &str) -> StellarResult<MuxedAccount> {
    if address.starts_with('M') {
        let muxed = StrkeyMuxedAccount::from_string(address)
            .map_err(|_| StellarError::invalid_address(address))?;
        Ok(MuxedAccount::MuxedEd25519(MuxedAccountMed25519 {
            id: muxed.id,
            ed25519: Uint256(muxed.ed25519),
        }))
    } else {
        let public_key = StrkeyPublicKey::from_string(address)
            .map_err(|_| StellarError::invalid_address(address))?;
        Ok(MuxedAccount::Ed25519(Uint256(public_key.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{SigningKey, Verifier};
    use stellar_xdr::next::ReadXdr;

    const DESTINATION: &str = "GCJRI5CIWK5IU67Q6DGA7QW52JDKRO7JEAHQKFNDUJUPEZGURDBX3LDX";
    const NOW: u64 = 1_700_000_000;

    fn admin() -> AdminKeypair {
        AdminKeypair::from_signing_key(SigningKey::from_bytes(&[3u8; 32]))
    }

    fn snapshot(sequence: i64) -> AccountSnapshot {
        AccountSnapshot {
            address: admin().public_address().to_string(),
            sequence,
            balances: vec![],
        }
    }

    #[test]
    fn test_intent_amount_validation() {
        assert_eq!(
            PaymentIntent::new(DESTINATION, "10.5").unwrap().amount_stroops,
            105_000_000
        );
        assert_eq!(
            PaymentIntent::new(DESTINATION, "0.0000001").unwrap().amount_stroops,
            1
        );
        for bad in ["0", "-5", "abc", "0.00000001", "NaN", "1.2.3"] {
            assert!(
                matches!(
                    PaymentIntent::new(DESTINATION, bad),
                    Err(IntentError::InvalidAmount(_))
                ),
                "amount {bad} should be rejected"
            );
        }
        assert_eq!(
            PaymentIntent::new("", "1"),
            Err(IntentError::MissingField)
        );
        assert_eq!(
            PaymentIntent::new(DESTINATION, "  "),
            Err(IntentError::MissingField)
        );
    }

    #[test]
    fn test_trailing_zeros_beyond_seven_places_are_accepted() {
        let intent = PaymentIntent::new(DESTINATION, "1.500000000").unwrap();
        assert_eq!(intent.amount_stroops, 15_000_000);
        assert_eq!(intent.amount, "1.500000000");
    }

    #[test]
    fn test_envelope_uses_next_sequence_and_base_fee() {
        let intent = PaymentIntent::new(DESTINATION, "10.5").unwrap();
        let env =
            PaymentEnvelope::native_payment(&snapshot(100), 100, &intent, Duration::from_secs(30), NOW)
                .unwrap();

        assert_eq!(env.sequence, 101);
        assert_eq!(env.fee, 100);
        assert_eq!(env.min_time, 0);
        assert_eq!(env.max_time, NOW + 30);
        assert_eq!(env.destination, DESTINATION);
        assert_eq!(env.amount, "10.5");
    }

    #[test]
    fn test_building_twice_from_same_snapshot_is_identical() {
        let intent = PaymentIntent::new(DESTINATION, "1").unwrap();
        let snap = snapshot(41);
        let a = PaymentEnvelope::native_payment(&snap, 200, &intent, Duration::from_secs(30), NOW)
            .unwrap();
        let b = PaymentEnvelope::native_payment(&snap, 200, &intent, Duration::from_secs(30), NOW)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(snap.sequence, 41);
        assert_eq!(
            a.hash(StellarNetwork::Testnet).unwrap(),
            b.hash(StellarNetwork::Testnet).unwrap()
        );
    }

    #[test]
    fn test_invalid_destination_fails_before_signing() {
        let intent = PaymentIntent::new("GNOTANADDRESS", "1").unwrap();
        let result =
            PaymentEnvelope::native_payment(&snapshot(1), 100, &intent, Duration::from_secs(30), NOW);
        assert!(matches!(result, Err(StellarError::InvalidAddress { .. })));
    }

    #[test]
    fn test_signed_envelope_round_trips_and_verifies() {
        let keypair = admin();
        let intent = PaymentIntent::new(DESTINATION, "2.25").unwrap();
        let env =
            PaymentEnvelope::native_payment(&snapshot(7), 100, &intent, Duration::from_secs(30), NOW)
                .unwrap();
        let signed = env.sign(&keypair, StellarNetwork::Testnet).unwrap();

        let decoded =
            TransactionEnvelope::from_xdr_base64(signed.to_xdr_base64().unwrap(), Limits::none())
                .unwrap();
        let v1 = match decoded {
            TransactionEnvelope::Tx(v1) => v1,
            other => panic!("unexpected envelope: {other:?}"),
        };
        assert_eq!(v1.signatures.len(), 1);
        assert_eq!(v1.tx.seq_num, SequenceNumber(8));
        assert_eq!(v1.tx.fee, 100);
        assert_eq!(v1.tx.operations.len(), 1);
        match &v1.tx.operations[0].body {
            OperationBody::Payment(op) => {
                assert_eq!(op.asset, Asset::Native);
                assert_eq!(op.amount, 22_500_000);
            }
            other => panic!("unexpected operation: {other:?}"),
        }

        let verifying = SigningKey::from_bytes(&[3u8; 32]).verifying_key();
        let signature = ed25519_dalek::Signature::from_bytes(&signed.signature);
        assert!(verifying.verify(&signed.hash, &signature).is_ok());
    }

    #[test]
    fn test_signature_is_bound_to_network() {
        let intent = PaymentIntent::new(DESTINATION, "1").unwrap();
        let env =
            PaymentEnvelope::native_payment(&snapshot(1), 100, &intent, Duration::from_secs(30), NOW)
                .unwrap();
        assert_ne!(
            env.hash(StellarNetwork::Testnet).unwrap(),
            env.hash(StellarNetwork::Mainnet).unwrap()
        );
    }

    #[test]
    fn test_sign_rejects_foreign_source() {
        let intent = PaymentIntent::new(DESTINATION, "1").unwrap();
        let mut snap = snapshot(1);
        snap.address = DESTINATION.to_string();
        let env =
            PaymentEnvelope::native_payment(&snap, 100, &intent, Duration::from_secs(30), NOW)
                .unwrap();
        assert!(matches!(
            env.sign(&admin(), StellarNetwork::Testnet),
            Err(StellarError::SigningError { .. })
        ));
    }
}
