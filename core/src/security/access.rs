/**
 * Access check evaluation over directory ACLs
 *
 * `Ace::matches` decides whether a single entry grants (or denies) a requested right.
 * `Acl::is_effectively_allowed` layers deny precedence on top: an allow entry is overridden by an
 * earlier deny entry for the same trustee. Entries are never re-sorted
 */
use super::{ace::Ace, ace::AceType, acl::Acl, guid::Guid, sid::Sid};
use log::warn;

/// Schema knowledge needed to resolve property set (attribute group) scoped ACEs
pub trait PropertySets {
    /// The `attributeSecurityGUID` of the attribute with the provided `schemaIDGUID`
    fn attribute_security_guid(&self, attribute: &Guid) -> Option<Guid>;
}

/// No schema information. Property set indirection never matches
pub struct NoPropertySets;

impl PropertySets for NoPropertySets {
    fn attribute_security_guid(&self, _attribute: &Guid) -> Option<Guid> {
        None
    }
}

impl Ace {
    /**
     * Check if this entry applies to `requested_mask`/`requested_guid` with the wanted polarity.
     * `object_classes` are the class GUIDs of the object holding the ACE, `None` when unknown.
     * A `requested_mask` of zero skips the mask check
     */
    pub fn matches<P: PropertySets + ?Sized>(
        &self,
        object_classes: Option<&[Guid]>,
        requested_mask: u32,
        requested_guid: &Guid,
        want_allow: bool,
        property_sets: &P,
    ) -> bool {
        if self.is_inherit_only() {
            return false;
        }

        if requested_mask != 0 && (self.mask & requested_mask) != requested_mask {
            return false;
        }

        if let Some(object_type) = self.object_scope() {
            let property_set = property_sets.attribute_security_guid(requested_guid);
            if object_type != requested_guid && property_set.as_ref() != Some(object_type) {
                return false;
            }
        }

        match self.ace_type {
            AceType::AccessAllowed => want_allow,
            AceType::AccessDenied => !want_allow,
            AceType::AccessAllowedObject | AceType::AccessDeniedObject => {
                if self.ace_type.is_allow() != want_allow {
                    return false;
                }
                match &self.inherited_object_type {
                    None => true,
                    Some(inherited) if inherited.is_null() => {
                        warn!(
                            "[security] ACE for {} has a null inherited object type, treating it as matching everything",
                            self.trustee
                        );
                        true
                    }
                    Some(inherited) => match object_classes {
                        Some(classes) => classes.contains(inherited),
                        None => false,
                    },
                }
            }
            _ => false,
        }
    }
}

impl Acl {
    /**
     * Check if the entry at `index` grants the request and is not overridden by an earlier deny
     * for the same trustee. Earlier denies win when unscoped and the request is for any right
     * (null GUID), or when scoped to exactly the requested GUID
     */
    pub fn is_effectively_allowed<P: PropertySets + ?Sized>(
        &self,
        index: usize,
        object_classes: Option<&[Guid]>,
        requested_mask: u32,
        requested_guid: &Guid,
        property_sets: &P,
    ) -> bool {
        let entry = match self.entries.get(index) {
            Some(result) => result,
            None => return false,
        };
        if !entry.matches(
            object_classes,
            requested_mask,
            requested_guid,
            true,
            property_sets,
        ) {
            return false;
        }

        for prior in &self.entries[..index] {
            if prior.trustee != entry.trustee {
                continue;
            }
            if !prior.matches(
                object_classes,
                requested_mask,
                requested_guid,
                false,
                property_sets,
            ) {
                continue;
            }

            match prior.object_scope() {
                None if requested_guid.is_null() => return false,
                Some(scope) if scope == requested_guid => return false,
                _ => {}
            }
        }
        true
    }

    /// Every trustee with an effectively allowed entry for the request. Keeps ACL order, no duplicates
    pub fn allowed_trustees<P: PropertySets + ?Sized>(
        &self,
        object_classes: Option<&[Guid]>,
        requested_mask: u32,
        requested_guid: &Guid,
        property_sets: &P,
    ) -> Vec<Sid> {
        let mut trustees: Vec<Sid> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if trustees.contains(&entry.trustee) {
                continue;
            }
            if self.is_effectively_allowed(
                index,
                object_classes,
                requested_mask,
                requested_guid,
                property_sets,
            ) {
                trustees.push(entry.trustee.clone());
            }
        }
        trustees
    }
}
