pub mod connectivity;
pub mod identity;
pub mod remote_source;

pub use connectivity::ConnectivityProbe;
pub use identity::IdentityProvider;
pub use remote_source::{RemoteDocument, RemoteDocumentSource};
