/**
 * Access control types: the READ/WRITE privilege
 *  levels and the principal-to-privilege mapping
 *  attached to every space.
 */
pub mod acl;
/**
 * The error taxonomy shared by every remote
 *  operation, plus the operation/space/content
 *  context attached to each raised error.
 */
pub mod error;
/**
 * Reserved property names and the property-map
 *  alias used for both space and content
 *  properties.
 */
pub mod props;
/**
 * The space value object: id, properties and a
 *  single page of content ids.
 */
pub mod space;

pub mod prelude {
    pub use crate::acl::{AclMap, AclType, ParseAclError};
    pub use crate::error::{ErrorContext, Result, StoreError};
    pub use crate::props::Properties;
    pub use crate::space::Space;
}

pub use acl::{AclMap, AclType};
pub use error::{ErrorContext, StoreError};
pub use props::Properties;
pub use space::Space;
