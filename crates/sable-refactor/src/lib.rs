//! Refactorings over a [`sable_workspace::Project`].
//!
//! The only refactoring today is [create custom delegate](create_custom_delegate). Its
//! building blocks are reusable: [`shape`] classifies delegate-typed parameters, [`names`]
//! recovers parameter names from comments, [`synthesis`] writes the declaration,
//! [`call_sites`] finds forwarding callers and [`edit`] applies tagged edits atomically.

pub mod call_sites;
pub mod create_custom_delegate;
pub mod edit;
mod error;
pub mod names;
pub mod shape;
pub mod synthesis;

pub use call_sites::{find_call_sites, CallSite};
pub use create_custom_delegate::{
    apply_create_custom_delegate, offer_create_custom_delegate, CreateCustomDelegate,
    DelegateOffer, OfferSummary, RefactorPhase, CREATE_CUSTOM_DELEGATE_TITLE,
};
pub use edit::{DocumentEditBatch, Edit, EditBatches, NodeTag, Rewrite};
pub use error::{ApplyError, RefactorError};
pub use shape::{classify, DelegateParameter, ParameterShape};
