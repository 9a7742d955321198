//! 最短跳数路由
//!
//! 对每个根路由器在拓扑上做 BFS，得到一棵生成树；
//! 树中根到目标路径上紧邻根的节点就是去往目标的第一跳。
//! 边的权重不参与计算，距离只按跳数衡量。

use std::collections::{HashMap, HashSet, VecDeque};

use super::topology::Topology;
use crate::error::{Result, SimError};

#[derive(Debug)]
struct TreeNode {
    router: String,
    children: Vec<usize>,
}

/// 以某个路由器为根的 BFS 生成树（只在构建路由表时临时存在）
#[derive(Debug)]
pub struct SpanningTree {
    /// nodes[0] 为根
    nodes: Vec<TreeNode>,
}

impl SpanningTree {
    pub fn new(topology: &Topology, root: &str) -> Result<Self> {
        if topology.router(root).is_none() {
            return Err(SimError::UnknownRouter(root.to_string()));
        }

        let mut nodes = vec![TreeNode {
            router: root.to_string(),
            children: Vec::new(),
        }];
        let mut visited: HashSet<&str> = HashSet::from([root]);
        let mut q: VecDeque<usize> = VecDeque::from([0]);

        while let Some(idx) = q.pop_front() {
            let Some(neighbors) = topology.neighbors(&nodes[idx].router) else {
                continue;
            };
            for nbr in neighbors {
                if visited.insert(nbr.as_str()) {
                    let child = nodes.len();
                    nodes.push(TreeNode {
                        router: nbr.clone(),
                        children: Vec::new(),
                    });
                    nodes[idx].children.push(child);
                    q.push_back(child);
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn root(&self) -> &str {
        &self.nodes[0].router
    }

    /// 树中的路由器数量（即从根可达的路由器数量）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, router: &str) -> bool {
        self.nodes.iter().any(|n| n.router == router)
    }

    /// 深度优先遍历树，返回根到 `target` 的路径（含两端）
    pub fn path_to(&self, target: &str) -> Option<Vec<&str>> {
        let mut stack = vec![(0usize, 0usize)];
        let mut path: Vec<usize> = Vec::new();

        while let Some((idx, depth)) = stack.pop() {
            path.truncate(depth);
            path.push(idx);
            if self.nodes[idx].router == target {
                return Some(path.iter().map(|&i| self.nodes[i].router.as_str()).collect());
            }
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        None
    }

    /// 从根出发去往 `target` 的第一跳。目标是根本身或根的邻居时直接返回目标。
    pub fn next_hop(&self, target: &str) -> Option<&str> {
        let root = &self.nodes[0];
        if root.router == target {
            return Some(root.router.as_str());
        }
        // BFS 第一层恰好是根的全部邻居
        if let Some(&child) = root
            .children
            .iter()
            .find(|&&c| self.nodes[c].router == target)
        {
            return Some(self.nodes[child].router.as_str());
        }

        let mut path = self.path_to(target)?;
        path.truncate(2);
        path.pop()
    }
}

/// 单个路由器的路由表：目的地 -> 下一跳
#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    next_hops: HashMap<String, String>,
}

impl RoutingTable {
    /// 基于以 `root` 为根的生成树构建路由表；不可达的目的地不会出现在表中
    pub fn build(topology: &Topology, root: &str) -> Result<Self> {
        let tree = SpanningTree::new(topology, root)?;
        let mut next_hops = HashMap::with_capacity(topology.len());
        next_hops.insert(root.to_string(), root.to_string());
        for dst in topology.router_names() {
            if let Some(nh) = tree.next_hop(dst) {
                next_hops.insert(dst.to_string(), nh.to_string());
            }
        }
        Ok(Self { next_hops })
    }

    /// 获取去往 `destination` 的下一跳
    pub fn next_hop(&self, destination: &str) -> Option<&str> {
        self.next_hops.get(destination).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.next_hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_hops.is_empty()
    }
}
