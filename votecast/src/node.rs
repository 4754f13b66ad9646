use crate::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::convert::TryFrom;

/// Number of control-component nodes taking part in every election
pub const NUMBER_OF_NODES: usize = 4;

/// One of the four control-component nodes (CCR1 to CCR4)
#[derive(
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NodeId {
    Ccr1 = 1,
    Ccr2 = 2,
    Ccr3 = 3,
    Ccr4 = 4,
}

impl NodeId {
    /// All node ids in canonical order
    pub const ALL: [NodeId; NUMBER_OF_NODES] =
        [NodeId::Ccr1, NodeId::Ccr2, NodeId::Ccr3, NodeId::Ccr4];

    /// Parse a node id from its number
    pub fn from_number(number: u8) -> Result<Self, PreconditionError> {
        NodeId::try_from(number).map_err(|_| PreconditionError::InvalidNodeId(number))
    }

    /// The node's number, 1 to 4
    pub fn number(self) -> u8 {
        self.into()
    }

    /// Zero-based position of this node in node-indexed collections
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Exactly one value per node, stored in node order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeIndexed<T>([T; NUMBER_OF_NODES]);

impl<T> NodeIndexed<T> {
    /// Index a per-node collection.
    ///
    /// Fails unless there are exactly as many items as nodes and every node appears once.
    pub fn from_items<F>(what: &'static str, items: Vec<T>, node_of: F) -> Result<Self, PreconditionError>
    where
        F: Fn(&T) -> NodeId,
    {
        if items.len() != NUMBER_OF_NODES {
            return Err(PreconditionError::WrongNumberOfExtractions {
                what,
                found: items.len(),
            });
        }

        let mut slots: [Option<T>; NUMBER_OF_NODES] = [None, None, None, None];
        for item in items {
            let node_id = node_of(&item);
            let slot = &mut slots[node_id.index()];
            if slot.is_some() {
                return Err(PreconditionError::DuplicateNodeId { what, node_id });
            }
            *slot = Some(item);
        }

        match slots {
            [Some(a), Some(b), Some(c), Some(d)] => Ok(NodeIndexed([a, b, c, d])),
            // Four distinct node ids always fill every slot
            _ => Err(PreconditionError::WrongNumberOfExtractions {
                what,
                found: NUMBER_OF_NODES,
            }),
        }
    }

    pub fn get(&self, node_id: NodeId) -> &T {
        &self.0[node_id.index()]
    }

    /// Iterate in node order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.0
            .iter()
            .enumerate()
            .map(|(index, item)| (NodeId::ALL[index], item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        assert_eq!(NodeId::from_number(1).unwrap(), NodeId::Ccr1);
        assert_eq!(NodeId::from_number(4).unwrap().index(), 3);
        assert_eq!(
            NodeId::from_number(0),
            Err(PreconditionError::InvalidNodeId(0))
        );
        assert_eq!(
            NodeId::from_number(5),
            Err(PreconditionError::InvalidNodeId(5))
        );
        assert_eq!(NodeId::Ccr3.to_string(), "3");

        let json = serde_json::to_string(&NodeId::Ccr2).unwrap();
        assert_eq!(json, "2");
        assert!(serde_json::from_str::<NodeId>("7").is_err());
    }

    #[test]
    fn test_node_indexed() {
        let items = vec![(NodeId::Ccr3, "c"), (NodeId::Ccr1, "a"), (NodeId::Ccr4, "d"), (NodeId::Ccr2, "b")];
        let indexed = NodeIndexed::from_items("items", items, |item| item.0).unwrap();
        let ordered: Vec<&str> = indexed.iter().map(|(_, item)| item.1).collect();
        assert_eq!(ordered, vec!["a", "b", "c", "d"]);
        assert_eq!(indexed.get(NodeId::Ccr3).1, "c");

        let too_few = vec![(NodeId::Ccr1, "a"), (NodeId::Ccr2, "b")];
        assert_eq!(
            NodeIndexed::from_items("items", too_few, |item| item.0),
            Err(PreconditionError::WrongNumberOfExtractions {
                what: "items",
                found: 2
            })
        );

        let duplicated = vec![(NodeId::Ccr1, "a"), (NodeId::Ccr2, "b"), (NodeId::Ccr2, "c"), (NodeId::Ccr4, "d")];
        assert_eq!(
            NodeIndexed::from_items("items", duplicated, |item| item.0),
            Err(PreconditionError::DuplicateNodeId {
                what: "items",
                node_id: NodeId::Ccr2
            })
        );
    }
}
