//! Authority: who may mutate registry state.
//!
//! A [`Caller`] is an identity that has proven possession of its key, either by
//! holding the [`Keypair`] directly or by presenting a signature over an
//! [`OperationIntent`]. Privileged checks compare the caller's identity
//! against a stored permitted identity.

use serde::{Deserialize, Serialize};

use crate::canonical::signed_message;
use crate::crypto::{Ed25519Signature, Fingerprint, Identity, Keypair};
use crate::error::{CoreError, TransitionError};
use crate::record::{DocumentMetadata, Registry};

/// The operation a caller is authorizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationIntent {
    /// Create the registry singleton.
    InitializeRegistry,
    /// Register a document under its fingerprint.
    RegisterDocument {
        fingerprint: Fingerprint,
        metadata: DocumentMetadata,
    },
    /// Flag the record registered under `fingerprint` as modified.
    FlagModification {
        fingerprint: Fingerprint,
        new_hash: Fingerprint,
    },
}

impl OperationIntent {
    /// Sign this intent.
    pub fn sign(&self, keypair: &Keypair) -> Ed25519Signature {
        keypair.sign(&signed_message(self))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            OperationIntent::InitializeRegistry => "initialize_registry",
            OperationIntent::RegisterDocument { .. } => "register_document",
            OperationIntent::FlagModification { .. } => "flag_modification",
        }
    }
}

/// An authenticated caller.
///
/// There is no way to build a `Caller` from a bare [`Identity`].
#[derive(Debug, Clone)]
pub struct Caller {
    identity: Identity,
    /// Set when authenticated by signature; binds the caller to one operation.
    intent: Option<OperationIntent>,
}

impl Caller {
    /// A caller that holds its signing key.
    ///
    /// Such a caller may perform any operation.
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            identity: keypair.identity(),
            intent: None,
        }
    }

    /// Authenticate a remote caller by its signature over `intent`.
    pub fn authenticate(
        identity: Identity,
        intent: OperationIntent,
        signature: &Ed25519Signature,
    ) -> Result<Self, CoreError> {
        identity.verify(&signed_message(&intent), signature)?;
        Ok(Self {
            identity,
            intent: Some(intent),
        })
    }

    /// The caller's identity.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// The signed intent, if the caller was authenticated by signature.
    pub fn intent(&self) -> Option<&OperationIntent> {
        self.intent.as_ref()
    }

    /// Check that this caller authorized `requested`.
    pub fn ensure_permits(&self, requested: &OperationIntent) -> Result<(), CoreError> {
        match &self.intent {
            None => Ok(()),
            Some(signed) if signed == requested => Ok(()),
            Some(_) => Err(CoreError::IntentMismatch),
        }
    }
}

/// Who controls a record's modification flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityPolicy {
    /// The identity that registered the record.
    #[default]
    Registrar,
    /// The registry authority at registration time.
    Registry,
}

impl AuthorityPolicy {
    /// Resolve the controlling authority for a new record.
    pub fn controlling_authority(self, registry: &Registry, registrar: &Identity) -> Identity {
        match self {
            AuthorityPolicy::Registrar => *registrar,
            AuthorityPolicy::Registry => registry.authority,
        }
    }
}

/// Who may register documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Any authenticated caller.
    #[default]
    Open,
    /// Only the registry authority.
    AuthorityOnly,
}

impl RegistrationPolicy {
    /// Check that `caller` may register under this policy.
    pub fn ensure_may_register(
        self,
        registry: &Registry,
        caller: &Identity,
    ) -> Result<(), TransitionError> {
        match self {
            RegistrationPolicy::Open => Ok(()),
            RegistrationPolicy::AuthorityOnly if *caller == registry.authority => Ok(()),
            RegistrationPolicy::AuthorityOnly => Err(TransitionError::Unauthorized {
                caller: *caller,
                required: registry.authority,
            }),
        }
    }
}
