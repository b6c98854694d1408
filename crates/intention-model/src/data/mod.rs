// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub mod history;
pub mod intentions;
pub mod signatures;
pub mod statements;
pub mod storage;
pub mod types;

use history::IntentionHistory;
use intentions::*;

/// Handle of an intention inside an `IntentionCollection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentionId(usize);

impl IntentionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for IntentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Invariant violations
// ============================================================================

/// A structural invariant of the intention collection that does not hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A handle that does not refer to any node
    InvalidHandle { id: IntentionId },
    /// A member is listed by a container but points at a different parent
    ParentMismatch {
        member: IntentionId,
        holder: IntentionId,
        parent: Option<IntentionId>,
    },
    /// A member is listed by more than one container (or twice by one)
    MultipleOwners { member: IntentionId },
    /// A node claims a parent that does not list it
    DanglingParent {
        member: IntentionId,
        parent: IntentionId,
    },
    /// A member is stored in a list that does not match its kind
    MisplacedMember {
        member: IntentionId,
        holder: IntentionId,
    },
    /// Two instance variables of one container share a name
    DuplicateInstanceVariable {
        container: IntentionId,
        name: String,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::InvalidHandle { id } => {
                write!(f, "intention handle {} does not exist", id)
            }
            InvariantViolation::ParentMismatch {
                member,
                holder,
                parent,
            } => match parent {
                Some(parent) => write!(
                    f,
                    "intention {} is held by {} but its parent is {}",
                    member, holder, parent
                ),
                None => write!(
                    f,
                    "intention {} is held by {} but has no parent",
                    member, holder
                ),
            },
            InvariantViolation::MultipleOwners { member } => {
                write!(f, "intention {} is held by more than one container", member)
            }
            InvariantViolation::DanglingParent { member, parent } => write!(
                f,
                "intention {} names {} as its parent, which does not hold it",
                member, parent
            ),
            InvariantViolation::MisplacedMember { member, holder } => write!(
                f,
                "intention {} is stored in the wrong member list of {}",
                member, holder
            ),
            InvariantViolation::DuplicateInstanceVariable { container, name } => write!(
                f,
                "container {} holds more than one instance variable named `{}`",
                container, name
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

// ============================================================================
// Intention collection
// ============================================================================

/// All intentions of a translation unit set. Nodes live in an arena and are addressed by
/// `IntentionId`; containers own their members through ordered handle lists and each member
/// keeps a non-owning back-reference to its current container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentionCollection {
    nodes: Vec<Intention>,
    files: Vec<IntentionId>,
}

impl IntentionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: IntentionId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Get a node by handle
    /// Panics if the handle was not produced by this collection (indicates a bug in a caller)
    pub fn get(&self, id: IntentionId) -> &Intention {
        self.nodes
            .get(id.0)
            .unwrap_or_else(|| panic!("BUG: intention {} not in collection", id))
    }

    pub fn get_mut(&mut self, id: IntentionId) -> &mut Intention {
        self.nodes
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("BUG: intention {} not in collection", id))
    }

    pub fn kind(&self, id: IntentionId) -> &IntentionKind {
        &self.get(id).kind
    }

    pub fn parent(&self, id: IntentionId) -> Option<IntentionId> {
        self.get(id).parent
    }

    pub fn history(&self, id: IntentionId) -> &IntentionHistory {
        &self.get(id).history
    }

    pub fn history_mut(&mut self, id: IntentionId) -> &mut IntentionHistory {
        &mut self.get_mut(id).history
    }

    /// Creates a detached node
    pub fn insert(&mut self, kind: IntentionKind) -> IntentionId {
        let id = IntentionId(self.nodes.len());
        self.nodes.push(Intention::new(kind));
        id
    }

    // ------------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------------

    pub fn add_file(&mut self, file: FileGenerationIntention) -> IntentionId {
        let id = self.insert(IntentionKind::File(file));
        self.files.push(id);
        id
    }

    /// Removes a file from the collection. Its members stay attached to it and become
    /// unreachable.
    pub fn remove_file(&mut self, id: IntentionId) {
        self.files.retain(|f| *f != id);
    }

    /// Moves `child` into `parent`, detaching it from its current container first. Attaching
    /// an instance variable replaces an existing one with the same name.
    ///
    /// # Panics
    /// Panics if `parent` cannot hold a member of `child`'s kind (programmer misuse)
    pub fn attach(&mut self, parent: IntentionId, child: IntentionId) {
        let slot = self.get(child).kind.member_slot().unwrap_or_else(|| {
            panic!("BUG: {} cannot be held by a container", self.describe(child))
        });
        assert!(
            self.get(parent).kind.can_hold(slot),
            "BUG: {} cannot hold a {}",
            self.describe(parent),
            self.get(child).kind.kind_name()
        );

        self.detach(child);

        let ivar_name = self.instance_variable(child).map(|ivar| ivar.name.clone());
        if let Some(name) = ivar_name {
            if let Some(existing) = self.find_instance_variable(parent, &name) {
                log::trace!(
                    "replacing instance variable `{}` ({}) of {}",
                    name,
                    existing,
                    self.describe(parent)
                );
                self.detach(existing);
            }
        }

        if let Some(list) = self.get_mut(parent).kind.member_list_mut(slot) {
            list.push(child);
        }
        self.get_mut(child).parent = Some(parent);
    }

    /// Removes `child` from its container, returning the former container
    pub fn detach(&mut self, child: IntentionId) -> Option<IntentionId> {
        let parent = self.get(child).parent?;
        let slot = self.get(child).kind.member_slot()?;
        if let Some(list) = self.get_mut(parent).kind.member_list_mut(slot) {
            list.retain(|member| *member != child);
        }
        self.get_mut(child).parent = None;
        Some(parent)
    }

    /// Alias of `detach`, for call sites that discard the member for good
    pub fn remove(&mut self, member: IntentionId) {
        self.detach(member);
    }

    /// Creates a node and attaches it to `parent`
    pub fn add_member(&mut self, parent: IntentionId, kind: IntentionKind) -> IntentionId {
        let id = self.insert(kind);
        self.attach(parent, id);
        id
    }

    pub fn add_class(&mut self, file: IntentionId, class: ClassGenerationIntention) -> IntentionId {
        self.add_member(file, IntentionKind::Class(class))
    }

    pub fn add_class_extension(
        &mut self,
        file: IntentionId,
        extension: ClassExtensionGenerationIntention,
    ) -> IntentionId {
        self.add_member(file, IntentionKind::ClassExtension(extension))
    }

    pub fn add_protocol(
        &mut self,
        file: IntentionId,
        protocol: ProtocolGenerationIntention,
    ) -> IntentionId {
        self.add_member(file, IntentionKind::Protocol(protocol))
    }

    pub fn add_struct(
        &mut self,
        file: IntentionId,
        structure: StructGenerationIntention,
    ) -> IntentionId {
        self.add_member(file, IntentionKind::Struct(structure))
    }

    pub fn add_global_function(
        &mut self,
        file: IntentionId,
        function: GlobalFunctionGenerationIntention,
    ) -> IntentionId {
        self.add_member(file, IntentionKind::GlobalFunction(function))
    }

    pub fn add_property(
        &mut self,
        ty: IntentionId,
        property: PropertyGenerationIntention,
    ) -> IntentionId {
        self.add_member(ty, IntentionKind::Property(property))
    }

    pub fn add_method(
        &mut self,
        ty: IntentionId,
        method: MethodGenerationIntention,
    ) -> IntentionId {
        self.add_member(ty, IntentionKind::Method(method))
    }

    pub fn add_initializer(
        &mut self,
        ty: IntentionId,
        initializer: InitGenerationIntention,
    ) -> IntentionId {
        self.add_member(ty, IntentionKind::Initializer(initializer))
    }

    /// Adds an instance variable; an existing one with the same name is removed first
    pub fn add_instance_variable(
        &mut self,
        container: IntentionId,
        ivar: InstanceVariableGenerationIntention,
    ) -> IntentionId {
        self.add_member(container, IntentionKind::InstanceVariable(ivar))
    }

    // ------------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------------

    pub fn file(&self, id: IntentionId) -> Option<&FileGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn file_mut(&mut self, id: IntentionId) -> Option<&mut FileGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn class(&self, id: IntentionId) -> Option<&ClassGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: IntentionId) -> Option<&mut ClassGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn class_extension(&self, id: IntentionId) -> Option<&ClassExtensionGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::ClassExtension(extension) => Some(extension),
            _ => None,
        }
    }

    pub fn protocol(&self, id: IntentionId) -> Option<&ProtocolGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::Protocol(protocol) => Some(protocol),
            _ => None,
        }
    }

    pub fn property(&self, id: IntentionId) -> Option<&PropertyGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn property_mut(&mut self, id: IntentionId) -> Option<&mut PropertyGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn instance_variable(
        &self,
        id: IntentionId,
    ) -> Option<&InstanceVariableGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::InstanceVariable(ivar) => Some(ivar),
            _ => None,
        }
    }

    pub fn method(&self, id: IntentionId) -> Option<&MethodGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn method_mut(&mut self, id: IntentionId) -> Option<&mut MethodGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn initializer(&self, id: IntentionId) -> Option<&InitGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::Initializer(initializer) => Some(initializer),
            _ => None,
        }
    }

    pub fn initializer_mut(&mut self, id: IntentionId) -> Option<&mut InitGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::Initializer(initializer) => Some(initializer),
            _ => None,
        }
    }

    pub fn global_function(&self, id: IntentionId) -> Option<&GlobalFunctionGenerationIntention> {
        match &self.get(id).kind {
            IntentionKind::GlobalFunction(function) => Some(function),
            _ => None,
        }
    }

    pub fn type_intention(&self, id: IntentionId) -> Option<&dyn TypeIntention> {
        self.get(id).kind.as_type_intention()
    }

    /// Mutable access to the shared type data (name and conformances)
    pub fn type_data_mut(&mut self, id: IntentionId) -> Option<&mut TypeGenerationIntention> {
        match &mut self.get_mut(id).kind {
            IntentionKind::Class(class) => Some(&mut class.type_data),
            IntentionKind::ClassExtension(extension) => Some(&mut extension.type_data),
            IntentionKind::Protocol(protocol) => Some(&mut protocol.type_data),
            IntentionKind::Struct(structure) => Some(&mut structure.type_data),
            _ => None,
        }
    }

    pub fn instance_variable_container(
        &self,
        id: IntentionId,
    ) -> Option<&dyn InstanceVariableContainerIntention> {
        self.get(id).kind.as_instance_variable_container()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn file_intentions(&self) -> &[IntentionId] {
        &self.files
    }

    /// All type declarations, in file order
    pub fn type_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.files
            .iter()
            .filter_map(move |f| self.file(*f))
            .flat_map(|file| file.types.iter().copied())
    }

    pub fn class_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.type_intentions()
            .filter(move |id| matches!(self.kind(*id), IntentionKind::Class(_)))
    }

    pub fn extension_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.type_intentions()
            .filter(move |id| matches!(self.kind(*id), IntentionKind::ClassExtension(_)))
    }

    /// Classes and class extensions
    pub fn class_like_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.type_intentions().filter(move |id| {
            matches!(
                self.kind(*id),
                IntentionKind::Class(_) | IntentionKind::ClassExtension(_)
            )
        })
    }

    pub fn protocol_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.type_intentions()
            .filter(move |id| matches!(self.kind(*id), IntentionKind::Protocol(_)))
    }

    pub fn struct_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.type_intentions()
            .filter(move |id| matches!(self.kind(*id), IntentionKind::Struct(_)))
    }

    pub fn global_function_intentions(&self) -> impl Iterator<Item = IntentionId> + '_ {
        self.files
            .iter()
            .filter_map(move |f| self.file(*f))
            .flat_map(|file| file.global_functions.iter().copied())
    }

    pub fn properties_of(&self, ty: IntentionId) -> &[IntentionId] {
        self.type_intention(ty).map_or(&[], |t| t.properties())
    }

    pub fn methods_of(&self, ty: IntentionId) -> &[IntentionId] {
        self.type_intention(ty).map_or(&[], |t| t.methods())
    }

    pub fn initializers_of(&self, ty: IntentionId) -> &[IntentionId] {
        self.type_intention(ty).map_or(&[], |t| t.initializers())
    }

    pub fn instance_variables_of(&self, container: IntentionId) -> &[IntentionId] {
        self.instance_variable_container(container)
            .map_or(&[], |c| c.instance_variables())
    }

    pub fn find_instance_variable(
        &self,
        container: IntentionId,
        name: &str,
    ) -> Option<IntentionId> {
        self.instance_variables_of(container)
            .iter()
            .copied()
            .find(|id| self.instance_variable(*id).is_some_and(|ivar| ivar.name == name))
    }

    pub fn find_property(&self, ty: IntentionId, name: &str) -> Option<IntentionId> {
        self.properties_of(ty)
            .iter()
            .copied()
            .find(|id| self.property(*id).is_some_and(|p| p.name == name))
    }

    /// Protocol declared anywhere in the collection with the given name
    pub fn find_protocol(&self, name: &str) -> Option<IntentionId> {
        self.protocol_intentions()
            .find(|id| self.type_intention(*id).is_some_and(|t| t.type_name() == name))
    }

    /// The file a node ultimately belongs to
    pub fn file_of(&self, id: IntentionId) -> Option<IntentionId> {
        let mut current = id;
        loop {
            if self.file(current).is_some() {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    /// Short human-readable description, used in diagnostics
    pub fn describe(&self, id: IntentionId) -> String {
        let kind = &self.get(id).kind;
        let name = match kind {
            IntentionKind::File(file) => file.target_path.clone(),
            IntentionKind::Property(property) => property.name.clone(),
            IntentionKind::InstanceVariable(ivar) => ivar.name.clone(),
            IntentionKind::Method(method) => method.signature.name.clone(),
            IntentionKind::Initializer(_) => "init".to_string(),
            IntentionKind::GlobalFunction(function) => function.signature.name.clone(),
            other => other
                .as_type_intention()
                .map(|t| t.type_name().to_string())
                .unwrap_or_default(),
        };
        format!("{} `{}` ({})", kind.kind_name(), name, id)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Checks the ownership invariants: every held member points back at its holder, no
    /// member has two holders, members sit in the list matching their kind, and instance
    /// variable names are unique per container.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut held = BTreeSet::new();
        for id in self.files.iter().chain(self.all_member_ids()) {
            if !self.contains(*id) {
                return Err(InvariantViolation::InvalidHandle { id: *id });
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let holder = IntentionId(index);
            for (slot, members) in node.kind.member_lists() {
                let mut names = BTreeSet::new();
                for member in members {
                    let member_node = self.get(*member);
                    if member_node.parent != Some(holder) {
                        return Err(InvariantViolation::ParentMismatch {
                            member: *member,
                            holder,
                            parent: member_node.parent,
                        });
                    }
                    if !held.insert(*member) {
                        return Err(InvariantViolation::MultipleOwners { member: *member });
                    }
                    if member_node.kind.member_slot() != Some(slot) {
                        return Err(InvariantViolation::MisplacedMember {
                            member: *member,
                            holder,
                        });
                    }
                    if let IntentionKind::InstanceVariable(ivar) = &member_node.kind {
                        if !names.insert(ivar.name.as_str()) {
                            return Err(InvariantViolation::DuplicateInstanceVariable {
                                container: holder,
                                name: ivar.name.clone(),
                            });
                        }
                    }
                }
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let member = IntentionId(index);
            if let Some(parent) = node.parent {
                if !self.contains(parent) {
                    return Err(InvariantViolation::InvalidHandle { id: parent });
                }
                if !held.contains(&member) {
                    return Err(InvariantViolation::DanglingParent { member, parent });
                }
            }
        }
        Ok(())
    }

    fn all_member_ids(&self) -> impl Iterator<Item = &IntentionId> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.kind.member_lists())
            .flat_map(|(_, members)| members.iter())
    }
}

impl IntentionKind {
    fn can_hold(&self, slot: MemberSlot) -> bool {
        self.member_lists().iter().any(|(s, _)| *s == slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::ValueStorage;
    use crate::data::types::SwiftType;

    fn class_in_file(collection: &mut IntentionCollection, name: &str) -> IntentionId {
        let file = collection.add_file(FileGenerationIntention::new(format!("{}.m", name)));
        collection.add_class(file, ClassGenerationIntention::new(name))
    }

    #[test]
    fn test_moving_member_detaches_from_previous_holder() {
        let mut collection = IntentionCollection::new();
        let a = class_in_file(&mut collection, "A");
        let b = class_in_file(&mut collection, "B");
        let property = collection.add_property(
            a,
            PropertyGenerationIntention::new("value", ValueStorage::variable(SwiftType::int())),
        );

        collection.attach(b, property);

        assert!(collection.properties_of(a).is_empty());
        assert_eq!(collection.properties_of(b), &[property]);
        assert_eq!(collection.parent(property), Some(b));
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_instance_variable_names_are_unique() {
        let mut collection = IntentionCollection::new();
        let class = class_in_file(&mut collection, "A");
        let first = collection.add_instance_variable(
            class,
            InstanceVariableGenerationIntention::new(
                "_x",
                ValueStorage::variable(SwiftType::int()),
            ),
        );
        let second = collection.add_instance_variable(
            class,
            InstanceVariableGenerationIntention::new(
                "_x",
                ValueStorage::variable(SwiftType::string()),
            ),
        );
        collection.add_instance_variable(
            class,
            InstanceVariableGenerationIntention::new(
                "_y",
                ValueStorage::variable(SwiftType::int()),
            ),
        );

        assert_eq!(collection.instance_variables_of(class).len(), 2);
        assert_eq!(collection.find_instance_variable(class, "_x"), Some(second));
        assert_eq!(collection.parent(first), None);
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    fn test_detach_and_queries() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("Shapes.m"));
        let class = collection.add_class(file, ClassGenerationIntention::new("Shape"));
        let protocol =
            collection.add_protocol(file, ProtocolGenerationIntention::new("Drawable"));
        let extension = collection.add_class_extension(
            file,
            ClassExtensionGenerationIntention::new("Shape", Some("Drawing".into())),
        );

        assert_eq!(collection.class_intentions().collect::<Vec<_>>(), vec![class]);
        assert_eq!(collection.find_protocol("Drawable"), Some(protocol));
        assert_eq!(
            collection.class_like_intentions().collect::<Vec<_>>(),
            vec![class, extension]
        );
        assert_eq!(collection.file_of(class), Some(file));

        assert_eq!(collection.detach(extension), Some(file));
        assert_eq!(collection.extension_intentions().count(), 0);
        assert_eq!(collection.check_invariants(), Ok(()));
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_attaching_to_incompatible_container_panics() {
        let mut collection = IntentionCollection::new();
        let file = collection.add_file(FileGenerationIntention::new("A.m"));
        collection.add_property(
            file,
            PropertyGenerationIntention::new("x", ValueStorage::variable(SwiftType::int())),
        );
    }

    #[test]
    fn test_check_invariants_detects_broken_back_reference() {
        let mut collection = IntentionCollection::new();
        let a = class_in_file(&mut collection, "A");
        let method = collection.add_method(
            a,
            MethodGenerationIntention::new(signatures::FunctionSignature::new(
                "run",
                vec![],
                SwiftType::VOID,
            )),
        );
        collection.get_mut(method).parent = None;

        assert!(matches!(
            collection.check_invariants(),
            Err(InvariantViolation::ParentMismatch { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_structure() {
        let mut collection = IntentionCollection::new();
        let class = class_in_file(&mut collection, "A");
        collection.add_property(
            class,
            PropertyGenerationIntention::new("x", ValueStorage::variable(SwiftType::int())),
        );

        let json = serde_json::to_string(&collection).unwrap();
        let restored: IntentionCollection = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.check_invariants(), Ok(()));
        assert_eq!(restored.properties_of(class).len(), 1);
    }
}
