//! Object marking: the external-roots capability, the type-layout
//! capability, and the explicit mark worklist.
//!
//! Tracing uses an explicit work list rather than the thread stack, so a
//! deeply linked object graph cannot blow the collector's stack.

use crate::object::{header_addr, ObjectHeader};
use crate::space::Space;
use std::collections::VecDeque;
use uvm_util::DefId;

/// The core's sole question to the external Bundle about a μVM type's
/// size and reference layout.
pub trait TypeLayout: Send + Sync {
    /// Payload size in bytes for a fixed-size μVM type.
    fn fixed_size(&self, ty: DefId) -> usize;

    /// Payload size in bytes for a hybrid μVM type's fixed prefix plus
    /// `var_len` trailing elements.
    fn hybrid_size(&self, ty: DefId, var_len: u64) -> usize;

    /// Byte offsets of reference-typed fields within an instance of `ty`,
    /// relative to the payload's start address.
    fn ref_offsets(&self, ty: DefId, size: usize) -> Vec<usize>;
}

/// A caller-supplied capability with one operation: enumerate external GC
/// roots. Called exactly once per GC cycle, with the Heap lock not held.
///
/// `Sync` is required alongside `Send` because `Heap` holds the client
/// behind an `Arc` shared with its background collector thread.
pub trait Client: Send + Sync {
    fn mark_external_roots(&self, marker: &mut ObjectMarker<'_>);
}

/// Passed to [`Client::mark_external_roots`]. Accepts object references
/// and enqueues them for tracing.
pub struct ObjectMarker<'a> {
    space: &'a Space,
    worklist: VecDeque<usize>,
}

impl<'a> ObjectMarker<'a> {
    fn new(space: &'a Space) -> Self {
        Self {
            space,
            worklist: VecDeque::new(),
        }
    }

    /// Ignores null addresses, checks whether the address lies within the
    /// Space, and if unmarked, sets the mark bit and enqueues the object
    /// for field tracing.
    pub fn mark_obj_ref(&mut self, user_addr: usize) {
        if user_addr == 0 || !self.space.contains(user_addr) {
            return;
        }
        // SAFETY: `user_addr` is within the Space and every live object in
        // the Space has a valid header immediately preceding its payload.
        let header = unsafe { ObjectHeader::at(header_addr(user_addr)) };
        if !header.set_marked() {
            self.worklist.push_back(user_addr);
        }
    }
}

/// Trace every object reachable from the roots the client supplied,
/// consulting `layout` for each object's reference-typed fields.
pub fn trace(space: &Space, client: &dyn Client, layout: &dyn TypeLayout) {
    let mut marker = ObjectMarker::new(space);
    client.mark_external_roots(&mut marker);

    while let Some(user_addr) = marker.worklist.pop_front() {
        let header = unsafe { ObjectHeader::at(header_addr(user_addr)) };
        let offsets = layout.ref_offsets(header.type_id(), header.size());
        for offset in offsets {
            let field_addr = user_addr + offset;
            // SAFETY: `offset` is within the object's payload as reported
            // by the type layout, and payloads are word-aligned.
            let child = unsafe { crate::memory::read_u64(field_addr) as usize };
            marker.mark_obj_ref(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{payload_addr, HEADER_SIZE};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedLayout {
        ref_offsets: HashMap<u32, Vec<usize>>,
    }

    impl TypeLayout for FixedLayout {
        fn fixed_size(&self, _ty: DefId) -> usize {
            16
        }
        fn hybrid_size(&self, _ty: DefId, _var_len: u64) -> usize {
            16
        }
        fn ref_offsets(&self, ty: DefId, _size: usize) -> Vec<usize> {
            self.ref_offsets.get(&ty.0).cloned().unwrap_or_default()
        }
    }

    struct RootsClient {
        roots: Mutex<Vec<usize>>,
    }

    impl Client for RootsClient {
        fn mark_external_roots(&self, marker: &mut ObjectMarker<'_>) {
            for &r in self.roots.lock().unwrap().iter() {
                marker.mark_obj_ref(r);
            }
        }
    }

    fn alloc_object(space: &Space, block: usize, offset: usize, size: usize, ty: DefId) -> usize {
        let header = block + offset;
        unsafe {
            ObjectHeader::init_at(header, size, ty);
        }
        payload_addr(header)
    }

    #[test]
    fn traces_a_chain_of_two_objects() {
        let space = Space::new(64 * 1024, 64 * 1024);
        let block = space.get_block().unwrap();

        let leaf = alloc_object(&space, block, 0, 8, DefId(1));
        let root = alloc_object(&space, block, HEADER_SIZE + 8, 16, DefId(2));
        unsafe {
            crate::memory::write_u64(root, leaf as u64);
        }

        let mut ref_offsets = HashMap::new();
        ref_offsets.insert(2u32, vec![0]);
        let layout = FixedLayout { ref_offsets };
        let client = RootsClient {
            roots: Mutex::new(vec![root]),
        };

        trace(&space, &client, &layout);

        let root_header = unsafe { ObjectHeader::at(header_addr(root)) };
        let leaf_header = unsafe { ObjectHeader::at(header_addr(leaf)) };
        assert!(root_header.is_marked());
        assert!(leaf_header.is_marked());
    }

    #[test]
    fn ignores_null_roots() {
        let space = Space::new(64 * 1024, 64 * 1024);
        let layout = FixedLayout { ref_offsets: HashMap::new() };
        let client = RootsClient { roots: Mutex::new(vec![0]) };
        trace(&space, &client, &layout);
    }
}
