use crate::{*, error::*};
use std::{collections::{HashMap, HashSet}, fmt, panic::Location};

// Maximum number of tokens in an identity path. Overflowing it is an error rather than truncation, because truncation would make distinct widgets collide.
pub const MAX_ID_DEPTH: usize = 16;

// Opaque interned token. 0 is never handed out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct IdPart(u32);

// Path from the frame root to a widget, e.g. [window call site, loop call site, loop index 3, button call site].
// Recomputed every frame; equal paths from different frames mean "the same widget", which is what lets per-container state persist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WidgetId {
    parts: [IdPart; MAX_ID_DEPTH],
    len: u8,
}
impl WidgetId {
    pub fn len(&self) -> usize { self.len as usize }
    pub fn is_root(&self) -> bool { self.len == 0 }
    pub fn parts(&self) -> &[IdPart] { &self.parts[..self.len as usize] }

    pub fn push(mut self, part: IdPart) -> Result<WidgetId> {
        if self.len() >= MAX_ID_DEPTH {
            return err!(TooLong, "widget identity deeper than {} parts; too many nested id scopes", MAX_ID_DEPTH);
        }
        self.parts[self.len()] = part;
        self.len += 1;
        Ok(self)
    }

    pub fn pop(mut self) -> Result<WidgetId> {
        if self.len == 0 {
            return err!(Sanity, "no identity parts to pop");
        }
        self.len -= 1;
        self.parts[self.len()] = IdPart::default();
        Ok(self)
    }
}
impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WidgetId")?;
        f.debug_list().entries(self.parts().iter().map(|p| p.0)).finish()
    }
}

// Memoizes each distinct call site / string / integer into a token, so that deriving ids every frame doesn't allocate after the first frame.
// Tokens are per-context; don't compare ids across contexts.
// Tokens are never reused: an evicted source gets a fresh token when it comes back, so stale ids holding the old one match nothing.
#[derive(Default)]
pub struct IdInterner {
    callers: HashMap<(&'static str, u32, u32), IdPart>,
    strings: HashMap<String, IdPart>,
    ints: HashMap<usize, IdPart>,
    // Tokens handed out since the last evict_unused().
    used: HashSet<IdPart>,
    next: u32,
}
impl IdInterner {
    pub fn new() -> Self { Self::default() }

    fn alloc(next: &mut u32) -> IdPart { *next += 1; IdPart(*next) }

    pub fn caller(&mut self, loc: &'static Location<'static>) -> IdPart {
        let next = &mut self.next;
        let p = *self.callers.entry((loc.file(), loc.line(), loc.column())).or_insert_with(|| Self::alloc(next));
        self.used.insert(p);
        p
    }

    pub fn string(&mut self, s: &str) -> IdPart {
        let p = match self.strings.get(s) {
            Some(p) => *p,
            None => {
                let p = Self::alloc(&mut self.next);
                self.strings.insert(s.to_string(), p);
                p
            }
        };
        self.used.insert(p);
        p
    }

    pub fn int(&mut self, i: usize) -> IdPart {
        let next = &mut self.next;
        let p = *self.ints.entry(i).or_insert_with(|| Self::alloc(next));
        self.used.insert(p);
        p
    }

    // Total tokens handed out, including evicted ones.
    pub fn num_tokens(&self) -> usize { self.next as usize }

    // Sources currently memoized.
    pub fn len(&self) -> usize { self.callers.len() + self.strings.len() + self.ints.len() }

    // Forgets every source whose token wasn't handed out since the previous call and isn't in `keep`. Returns how many were forgotten.
    pub fn evict_unused(&mut self, keep: &HashSet<IdPart>) -> usize {
        let before = self.len();
        let used = &self.used;
        let live = |p: &IdPart| used.contains(p) || keep.contains(p);
        self.callers.retain(|_, p| live(&*p));
        self.strings.retain(|_, p| live(&*p));
        self.ints.retain(|_, p| live(&*p));
        self.used.clear();
        before - self.len()
    }
}
