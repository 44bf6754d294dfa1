/// Immutable bipartite graph in CSR form. Vertices 0..NA-1 are side A,
/// NA..NA+NB-1 are side B; every edge must cross sides.
#[derive(Debug, Clone)]
pub struct Graph {
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
    num_type_a: usize,
    num_edges: usize,
}

impl Graph {
    pub fn from_edge_list(
        edges: &[(u32, u32)],
        num_type_a: usize,
        num_type_b: usize,
    ) -> Result<Self, String> {
        let n = num_type_a + num_type_b;

        let mut counts = vec![0u32; n];
        for &(u, v) in edges {
            let (u, v) = (u as usize, v as usize);
            if u >= n || v >= n {
                return Err(format!(
                    "Edge ({}, {}) references a vertex outside 0..{}",
                    u, v, n
                ));
            }
            if (u < num_type_a) == (v < num_type_a) {
                return Err(format!(
                    "Edge ({}, {}) connects two vertices of the same type",
                    u, v
                ));
            }
            counts[u] += 1;
            counts[v] += 1;
        }

        let mut offsets = vec![0u32; n + 1];
        for i in 0..n {
            offsets[i + 1] = offsets[i] + counts[i];
        }

        let mut fill = vec![0u32; n];
        let mut neighbors = vec![0u32; 2 * edges.len()];
        for &(u, v) in edges {
            let (ui, vi) = (u as usize, v as usize);
            neighbors[(offsets[ui] + fill[ui]) as usize] = v;
            fill[ui] += 1;
            neighbors[(offsets[vi] + fill[vi]) as usize] = u;
            fill[vi] += 1;
        }

        Ok(Self {
            offsets,
            neighbors,
            num_type_a,
            num_edges: edges.len(),
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.num_edges
    }

    #[inline]
    pub fn num_type_a(&self) -> usize {
        self.num_type_a
    }

    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        (self.offsets[v + 1] - self.offsets[v]) as usize
    }

    // Contiguous slice: the proposal step indexes it with a random offset.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[u32] {
        &self.neighbors[self.offsets[v] as usize..self.offsets[v + 1] as usize]
    }

    #[inline]
    pub fn vertex_type(&self, v: usize) -> u8 {
        u8::from(v >= self.num_type_a)
    }
}
