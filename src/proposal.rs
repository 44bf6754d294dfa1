use crate::blockmodel::BlockState;
use crate::rng::MoveRng;

/// A candidate single-vertex move.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub vertex: usize,
    pub source: u32,
    pub target: u32,
}

/// Entropy change and log proposal-probability ratio for a candidate move.
/// The annealer combines these with the current inverse temperature.
#[derive(Debug, Clone, Copy)]
pub struct MoveWeight {
    pub d_entropy: f64,
    pub log_proposal_ratio: f64,
}

/// A move set for the Metropolis-Hastings chain. Only the neighbour-biased
/// rule is implemented; variable-K move sets would slot in here.
pub trait MoveProposal {
    fn sample<R: MoveRng>(&self, state: &BlockState, rng: &mut R) -> Move;
    fn log_acceptance(&self, state: &BlockState, mv: &Move) -> MoveWeight;
}

/// Peixoto's neighbour-biased single-vertex proposal. A random neighbour's
/// group t pulls the target toward groups well connected to t; an epsilon
/// mixture with the uniform distribution keeps every group reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighbourBiased;

impl MoveProposal for NeighbourBiased {
    fn sample<R: MoveRng>(&self, state: &BlockState, rng: &mut R) -> Move {
        let graph = state.graph();
        let v = rng.rand_int_inclusive(0, (graph.vertex_count() - 1) as u32) as usize;
        let source = state.membership(v);
        let (side_base, side_count) = state.side_groups(graph.vertex_type(v));

        let neighbors = graph.neighbors(v);
        if neighbors.is_empty() {
            let target = side_base + rng.rand_int_inclusive(0, side_count - 1);
            return Move {
                vertex: v,
                source,
                target,
            };
        }

        let u = neighbors[rng.rand_int_inclusive(0, (neighbors.len() - 1) as u32) as usize];
        let t = state.membership(u as usize) as usize;

        let eps_b = state.epsilon() * side_count as f64;
        let p_rand = eps_b / (state.m_r(t) as f64 + eps_b);
        let target = if rng.next_f64() < p_rand {
            side_base + rng.rand_int_inclusive(0, side_count - 1)
        } else {
            // Inverse transform over row t of m. Groups on t's own side carry
            // no mass in a bipartite graph, so the walk stays on v's side and
            // consumes exactly m_r[t].
            let mut x = rng.rand_int_inclusive(0, state.m_r(t) - 1);
            let mut picked = side_base + side_count - 1;
            for s in side_base..side_base + side_count {
                let w = state.m(t, s as usize);
                if x < w {
                    picked = s;
                    break;
                }
                x -= w;
            }
            picked
        };

        Move {
            vertex: v,
            source,
            target,
        }
    }

    fn log_acceptance(&self, state: &BlockState, mv: &Move) -> MoveWeight {
        let (v, r, s) = (mv.vertex, mv.source as usize, mv.target as usize);
        if r == s {
            return MoveWeight {
                d_entropy: 0.0,
                log_proposal_ratio: 0.0,
            };
        }

        let graph = state.graph();
        let cache = state.cache();
        let deg_v = graph.degree(v) as u32;
        let side = graph.vertex_type(v);
        let (_, side_count) = state.side_groups(side);
        let (opp_base, opp_count) = state.side_groups(1 - side);
        let eps = state.epsilon();
        let eps_b = eps * side_count as f64;
        let k_row = state.k_row(v);

        // Only rows/cols r and s of m change, and only in the cells paired
        // with a group that holds some of v's neighbours. Each such unordered
        // pair appears twice in the halved double sum, so it carries weight 1.
        // The same loop accumulates both directions of the proposal mixture;
        // the stub totals on the opposite side are unchanged by the move, so
        // the reverse probability only needs the shifted m cells.
        let mut d_entropy = 0.0;
        let mut forward = 0.0;
        let mut reverse = 0.0;
        for t in opp_base as usize..(opp_base + opp_count) as usize {
            let k_vt = k_row[t];
            if k_vt == 0 {
                continue;
            }
            let m_rt = state.m(r, t);
            let m_st = state.m(s, t);
            d_entropy -= cache.safe_x_log_x(m_rt - k_vt) - cache.safe_x_log_x(m_rt)
                + cache.safe_x_log_x(m_st + k_vt)
                - cache.safe_x_log_x(m_st);

            let denom = state.m_r(t) as f64 + eps_b;
            reverse += k_vt as f64 * ((m_rt - k_vt) as f64 + eps) / denom;
            forward += k_vt as f64 * (m_st as f64 + eps) / denom;
        }

        // Stub totals change for r and s only; every other m_r term cancels.
        let m_r_r = state.m_r(r);
        let m_r_s = state.m_r(s);
        d_entropy += cache.safe_x_log_x(m_r_r - deg_v) - cache.safe_x_log_x(m_r_r)
            + cache.safe_x_log_x(m_r_s + deg_v)
            - cache.safe_x_log_x(m_r_s);

        // Degree-zero vertices are proposed uniformly in both directions.
        let log_proposal_ratio = if deg_v == 0 {
            0.0
        } else {
            (reverse / forward).ln()
        };

        MoveWeight {
            d_entropy,
            log_proposal_ratio,
        }
    }
}
