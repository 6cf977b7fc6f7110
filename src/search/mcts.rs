//! Arena-backed search tree.
//!
//! Node statistics are kept from the perspective of the player who made the
//! move leading into the node, so a parent simply maximizes over its
//! children's means and backpropagation negates the value at each ply.

use crate::board::{Board, Move};
use crate::eval::Evaluator;
use crate::rules::{legal_moves, position_status, Termination};

use super::{Limits, RootChildStats};

type NodeId = usize;

const ROOT: NodeId = 0;

struct Node {
    board: Board,
    mv: Option<Move>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    /// Fixed value for finished positions, mover's perspective.
    terminal: Option<f64>,
    prior: f64,
    n: u32,
    w: f64,
}

impl Node {
    fn new(board: Board, mv: Option<Move>, parent: Option<NodeId>, prior: f64) -> Self {
        Self { board, mv, parent, children: Vec::new(), expanded: false, terminal: None, prior, n: 0, w: 0.0 }
    }

    fn mean(&self) -> f64 {
        if self.n == 0 { self.prior } else { self.w / self.n as f64 }
    }
}

pub(crate) struct Tree<'a> {
    nodes: Vec<Node>,
    evaluator: Evaluator<'a>,
    c: f64,
}

impl<'a> Tree<'a> {
    /// A tree whose root is already expanded with `root_moves`, which may be
    /// a subset of the legal moves when the root is split across workers.
    pub fn new(board: &Board, root_moves: &[Move], evaluator: Evaluator<'a>, c: f64) -> Self {
        let mut tree = Self { nodes: Vec::with_capacity(1024), evaluator, c };
        tree.nodes.push(Node::new(*board, None, None, 0.0));
        tree.add_children(ROOT, root_moves);
        tree
    }

    fn add_children(&mut self, id: NodeId, moves: &[Move]) {
        let parent_board = self.nodes[id].board;
        for &mv in moves {
            let child = parent_board.apply(mv);
            let prior = -self.evaluator.evaluate_board(&child);
            let cid = self.nodes.len();
            self.nodes.push(Node::new(child, Some(mv), Some(id), prior));
            self.nodes[id].children.push(cid);
        }
        self.nodes[id].expanded = true;
    }

    /// Creates the children of an unexpanded node, or marks it terminal.
    fn expand(&mut self, id: NodeId) {
        let board = self.nodes[id].board;
        if let Some(outcome) = position_status(&board) {
            // The side to move here is the one that got mated.
            let v = if outcome.termination == Termination::Checkmate { 1.0 } else { 0.0 };
            self.nodes[id].terminal = Some(v);
            self.nodes[id].expanded = true;
            return;
        }
        let moves = legal_moves(&board);
        self.add_children(id, &moves);
    }

    fn ucb(&self, parent_n: u32, child: &Node) -> f64 {
        let ln_n = (parent_n.max(1) as f64).ln();
        child.mean() + self.c * (ln_n / child.n.max(1) as f64).sqrt()
    }

    /// Highest UCB child; the first one wins ties.
    fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        let mut best: Option<(NodeId, f64)> = None;
        for &cid in &node.children {
            let score = self.ucb(node.n, &self.nodes[cid]);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((cid, score));
            }
        }
        best.map(|(cid, _)| cid)
    }

    fn backpropagate(&mut self, mut id: NodeId, mut v: f64) {
        loop {
            let node = &mut self.nodes[id];
            node.n += 1;
            node.w += v;
            match node.parent {
                Some(p) => {
                    id = p;
                    v = -v;
                }
                None => break,
            }
        }
    }

    /// One select / expand / evaluate / backpropagate pass. The reached
    /// leaf is expanded and its own prior (or terminal value) is backed up.
    fn iterate(&mut self) {
        let mut id = ROOT;
        while self.nodes[id].expanded && self.nodes[id].terminal.is_none() {
            match self.select_child(id) {
                Some(cid) => id = cid,
                None => break,
            }
        }
        if !self.nodes[id].expanded {
            self.expand(id);
        }
        let v = self.nodes[id].terminal.unwrap_or(self.nodes[id].prior);
        self.backpropagate(id, v);
    }

    /// Runs up to `iterations` passes; returns how many completed.
    pub fn run(&mut self, iterations: u32, limits: &Limits<'_>) -> u32 {
        let mut done = 0;
        while done < iterations && !limits.expired() {
            self.iterate();
            done += 1;
        }
        done
    }

    pub fn root_stats(&self) -> Vec<RootChildStats> {
        self.nodes[ROOT]
            .children
            .iter()
            .filter_map(|&cid| {
                let n = &self.nodes[cid];
                n.mv.map(|mv| RootChildStats { mv, visits: n.n, mean: n.mean(), prior: n.prior })
            })
            .collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{Brain, BrainConfig};
    use crate::eval::EvalWeights;
    use crate::search::CancelToken;

    fn limits(cancel: &CancelToken) -> Limits<'_> {
        Limits { deadline: None, cancel }
    }

    #[test]
    fn root_visits_equal_iterations() {
        let brain = Brain::new(BrainConfig::default());
        let b = Board::startpos();
        let moves = legal_moves(&b);
        let cancel = CancelToken::new();
        let mut tree = Tree::new(&b, &moves, Evaluator::new(&brain, EvalWeights::default()), 1.41);
        assert_eq!(tree.len(), 21);
        assert_eq!(tree.run(60, &limits(&cancel)), 60);
        let visits: u32 = tree.root_stats().iter().map(|s| s.visits).sum();
        assert_eq!(visits, 60);
        assert_eq!(tree.nodes[ROOT].n, 60);
    }

    #[test]
    fn mate_in_one_child_is_terminal_win() {
        let brain = Brain::new(BrainConfig::default());
        let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let moves = legal_moves(&b);
        let cancel = CancelToken::new();
        let mut tree = Tree::new(&b, &moves, Evaluator::new(&brain, EvalWeights::default()), 1.41);
        tree.run(400, &limits(&cancel));
        let mate = tree.root_stats().into_iter().find(|s| s.mv.to_string() == "a1a8").unwrap();
        assert!(mate.visits > 0);
        assert!((mate.mean - 1.0).abs() < 1e-9);
    }
}
