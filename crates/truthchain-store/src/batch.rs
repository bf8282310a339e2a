//! Write batches: all-or-nothing groups of conditional writes.

use std::collections::HashSet;

use truthchain_core::{Address, Fingerprint, Identity, TransitionError};

use crate::account::{Account, Versioned};
use crate::error::{Result, StoreError};
use crate::traits::CommitResult;

/// A state transition applied to whatever account is stored at commit time.
///
/// The store computes the new value from the current one while it holds the
/// commit lock, so concurrent transitions on one address are applied in some
/// serial order and none is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Count one more registration on the registry.
    RecordRegistration,
    /// Rotate a document's hashes on behalf of `caller`.
    FlagModification {
        caller: Identity,
        new_hash: Fingerprint,
        at: i64,
    },
}

impl Transition {
    /// Compute the successor of `account`.
    ///
    /// The outer error is a storage fault (the account is of the wrong kind);
    /// the inner one is a refused transition.
    pub fn apply(&self, account: Account) -> Result<std::result::Result<Account, TransitionError>> {
        match self {
            Transition::RecordRegistration => {
                let mut registry = account.into_registry()?;
                Ok(registry
                    .record_registration()
                    .map(|()| Account::Registry(registry)))
            }
            Transition::FlagModification {
                caller,
                new_hash,
                at,
            } => {
                let mut doc = account.into_document()?;
                Ok(doc
                    .ensure_controller(caller)
                    .and_then(|()| doc.flag_modification(*new_hash, *at))
                    .map(|()| Account::Document(doc)))
            }
        }
    }
}

/// A single conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create an account. Requires the address to be empty.
    Create { address: Address, account: Account },
    /// Transform the stored account. Requires the address to be occupied.
    Apply {
        address: Address,
        transition: Transition,
    },
}

impl WriteOp {
    /// The address this op writes.
    pub fn address(&self) -> &Address {
        match self {
            WriteOp::Create { address, .. } | WriteOp::Apply { address, .. } => address,
        }
    }
}

/// What a batch resolves to against the current store contents.
pub(crate) enum Resolution {
    /// Every precondition holds. The values to write, in op order.
    Ready(Vec<Versioned<Account>>),
    /// A precondition failed; nothing may be written.
    Rejected(CommitResult),
}

/// A group of writes to distinct addresses, committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a create-if-absent write.
    pub fn create(mut self, address: Address, account: Account) -> Self {
        self.ops.push(WriteOp::Create { address, account });
        self
    }

    /// Add a transition of the account at `address`.
    pub fn apply(mut self, address: Address, transition: Transition) -> Self {
        self.ops.push(WriteOp::Apply {
            address,
            transition,
        });
        self
    }

    /// The ops in insertion order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Reject batches no store could apply: empty, or touching one address twice.
    pub fn validate(&self) -> Result<()> {
        if self.ops.is_empty() {
            return Err(StoreError::InvalidBatch("empty batch".into()));
        }

        let mut seen = HashSet::with_capacity(self.ops.len());
        for op in &self.ops {
            if !seen.insert(*op.address()) {
                return Err(StoreError::InvalidBatch(format!(
                    "address {} written twice",
                    op.address()
                )));
            }
        }
        Ok(())
    }

    /// Check every op against the stored accounts, in op order, and compute
    /// the values to write.
    ///
    /// Backends call this while holding their commit lock or transaction.
    pub(crate) fn resolve<F>(&self, mut load: F) -> Result<Resolution>
    where
        F: FnMut(&Address) -> Result<Option<Versioned<Account>>>,
    {
        let mut staged = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let current = load(op.address())?;
            let next = match (op, current) {
                (WriteOp::Create { address, .. }, Some(_)) => {
                    return Ok(Resolution::Rejected(CommitResult::Occupied {
                        address: *address,
                    }));
                }
                (WriteOp::Create { account, .. }, None) => Versioned {
                    version: 1,
                    value: account.clone(),
                },
                (WriteOp::Apply { address, .. }, None) => {
                    return Ok(Resolution::Rejected(CommitResult::Missing {
                        address: *address,
                    }));
                }
                (
                    WriteOp::Apply {
                        address,
                        transition,
                    },
                    Some(current),
                ) => match transition.apply(current.value)? {
                    Ok(value) => Versioned {
                        version: current.version + 1,
                        value,
                    },
                    Err(reason) => {
                        return Ok(Resolution::Rejected(CommitResult::Refused {
                            address: *address,
                            reason,
                        }));
                    }
                },
            };
            staged.push(next);
        }
        Ok(Resolution::Ready(staged))
    }
}
