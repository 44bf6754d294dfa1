use crate::cache::LogCache;
use crate::graph::Graph;
use crate::rng::MoveRng;

/// Mutable summary of a group assignment: memberships, group sizes, the
/// per-vertex group-degree profile k, the group pair edge matrix m, and the
/// per-group stub totals m_r. A single-vertex move touches O(deg + K) of it;
/// nothing is recomputed from scratch inside the sweep loop.
///
/// Groups 0..KA-1 hold side-A vertices, KA..KA+KB-1 hold side-B vertices.
#[derive(Debug, Clone)]
pub struct BlockState<'a> {
    graph: &'a Graph,
    cache: LogCache,
    num_a_groups: u32,
    num_b_groups: u32,
    epsilon: f64,
    memberships: Vec<u32>,
    n: Vec<u32>,
    k: Vec<u32>,   // vertex_count x num_groups, row-major
    m: Vec<u32>,   // num_groups x num_groups, row-major, symmetric
    m_r: Vec<u32>, // row sums of m
    entropy_from_degree_correction: f64,
}

impl<'a> BlockState<'a> {
    pub fn new(
        graph: &'a Graph,
        cache: LogCache,
        memberships: Vec<u32>,
        num_a_groups: u32,
        num_b_groups: u32,
        epsilon: f64,
    ) -> Result<Self, String> {
        let num_vertices = graph.vertex_count();
        let num_groups = num_a_groups + num_b_groups;

        if num_a_groups == 0 || num_b_groups == 0 {
            return Err("Each side of the bipartition needs at least one group".to_string());
        }
        if memberships.len() != num_vertices {
            return Err(format!(
                "Membership vector has {} entries for {} vertices",
                memberships.len(),
                num_vertices
            ));
        }
        for (v, &mb) in memberships.iter().enumerate() {
            if mb >= num_groups {
                return Err(format!(
                    "Vertex {} assigned to group {} but only {} groups exist",
                    v, mb, num_groups
                ));
            }
            let on_a_side = mb < num_a_groups;
            if (graph.vertex_type(v) == 0) != on_a_side {
                return Err(format!(
                    "Vertex {} of type {} assigned to group {} on the other side",
                    v,
                    graph.vertex_type(v),
                    mb
                ));
            }
        }

        let mut entropy_from_degree_correction = 0.0;
        for v in 0..num_vertices {
            entropy_from_degree_correction += cache.log_fact(graph.degree(v) as u32);
        }

        let kt = num_groups as usize;
        let mut state = Self {
            graph,
            cache,
            num_a_groups,
            num_b_groups,
            epsilon,
            memberships,
            n: vec![0; kt],
            k: vec![0; num_vertices * kt],
            m: vec![0; kt * kt],
            m_r: vec![0; kt],
            entropy_from_degree_correction,
        };
        state.rebuild_summaries();
        Ok(state)
    }

    fn rebuild_summaries(&mut self) {
        let graph = self.graph;
        let kt = self.num_groups() as usize;
        let num_vertices = graph.vertex_count();

        self.n.fill(0);
        for &mb in &self.memberships {
            self.n[mb as usize] += 1;
        }

        self.k.fill(0);
        self.m.fill(0);
        for v in 0..num_vertices {
            let r = self.memberships[v] as usize;
            for &u in graph.neighbors(v) {
                let s = self.memberships[u as usize] as usize;
                self.k[v * kt + s] += 1;
                self.m[r * kt + s] += 1;
            }
        }

        for r in 0..kt {
            self.m_r[r] = self.m[r * kt..(r + 1) * kt].iter().sum();
        }
    }

    /// Moves vertex v to `target`, updating n, k, m and m_r in place.
    /// Returns false (leaving the state untouched) when the move would empty
    /// the source group; the caller treats that as a rejected proposal.
    pub fn apply_move(&mut self, v: usize, target: u32) -> bool {
        let source = self.memberships[v];
        let (r, s) = (source as usize, target as usize);

        self.n[r] -= 1;
        if self.n[r] == 0 {
            self.n[r] += 1;
            return false;
        }
        self.n[s] += 1;

        let graph = self.graph;
        let kt = self.num_groups() as usize;
        let deg = graph.degree(v) as u32;

        // Move v's profile row between rows r and s of m; the mirror writes
        // keep m symmetric. k[v] is read before any k row is written: v is
        // never its own neighbor, so its row is stable below.
        for i in 0..kt {
            let k_vi = self.k[v * kt + i];
            if k_vi != 0 {
                self.m[r * kt + i] -= k_vi;
                self.m[s * kt + i] += k_vi;
                self.m[i * kt + r] = self.m[r * kt + i];
                self.m[i * kt + s] = self.m[s * kt + i];
            }
        }
        self.m_r[r] -= deg;
        self.m_r[s] += deg;

        for &u in graph.neighbors(v) {
            let u = u as usize;
            self.k[u * kt + r] -= 1;
            self.k[u * kt + s] += 1;
        }

        self.memberships[v] = target;
        true
    }

    /// Random permutation of the memberships within each type block, then a
    /// full rebuild of the summaries.
    pub fn shuffle_within_types<R: MoveRng>(&mut self, rng: &mut R) {
        let na = self.graph.num_type_a();
        let (side_a, side_b) = self.memberships.split_at_mut(na);
        rng.shuffle_u32(side_a);
        rng.shuffle_u32(side_b);
        self.rebuild_summaries();
    }

    /// Description-length entropy of the current state, from scratch. The
    /// annealer evaluates this once and then tracks the per-move deltas.
    pub fn entropy(&self) -> f64 {
        let kt = self.num_groups() as usize;
        let mut entropy = self.entropy_from_degree_correction;
        for r in 0..kt {
            entropy += self.cache.safe_x_log_x(self.m_r[r]);
            for s in 0..kt {
                entropy -= 0.5 * self.cache.safe_x_log_x(self.m[r * kt + s]);
            }
        }
        entropy
    }

    #[inline]
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    #[inline]
    pub fn cache(&self) -> &LogCache {
        &self.cache
    }

    #[inline]
    pub fn num_groups(&self) -> u32 {
        self.num_a_groups + self.num_b_groups
    }

    #[inline]
    pub fn num_a_groups(&self) -> u32 {
        self.num_a_groups
    }

    #[inline]
    pub fn num_b_groups(&self) -> u32 {
        self.num_b_groups
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    #[inline]
    pub fn membership(&self, v: usize) -> u32 {
        self.memberships[v]
    }

    #[inline]
    pub fn memberships(&self) -> &[u32] {
        &self.memberships
    }

    #[inline]
    pub fn group_sizes(&self) -> &[u32] {
        &self.n
    }

    #[inline]
    pub fn k_row(&self, v: usize) -> &[u32] {
        let kt = self.num_groups() as usize;
        &self.k[v * kt..(v + 1) * kt]
    }

    #[inline]
    pub fn m(&self, r: usize, s: usize) -> u32 {
        self.m[r * self.num_groups() as usize + s]
    }

    #[inline]
    pub fn m_r(&self, r: usize) -> u32 {
        self.m_r[r]
    }

    #[inline]
    pub fn entropy_from_degree_correction(&self) -> f64 {
        self.entropy_from_degree_correction
    }

    /// First group id and group count on the given side of the bipartition.
    #[inline]
    pub fn side_groups(&self, vertex_type: u8) -> (u32, u32) {
        if vertex_type == 0 {
            (0, self.num_a_groups)
        } else {
            (self.num_a_groups, self.num_b_groups)
        }
    }
}
