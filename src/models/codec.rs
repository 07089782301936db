//! Self-describing binary codec for the two composite storage fields named
//! in spec §4.3: `t_chain.infos` (group list + service list) and
//! `t_chain_*.deploy_info` (`serviceName -> deployIP`).
//!
//! MessagePack (`rmp-serde`) is used rather than a hand-rolled
//! length-prefix format; spec §4.3 only requires "a self-describing
//! stable binary encoding... provided a single deployment uses one codec
//! throughout," and this is the codec Garage's table engine uses for the
//! same kind of row-payload encoding.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Serialize, Deserialize)]
struct ChainInfos {
    group_list: Vec<String>,
    service_list: Vec<String>,
}

pub fn encode_chain_infos(group_list: &BTreeSet<String>, service_list: &BTreeSet<String>) -> Result<Vec<u8>, CoreError> {
    let payload = ChainInfos {
        group_list: group_list.iter().cloned().collect(),
        service_list: service_list.iter().cloned().collect(),
    };
    rmp_serde::to_vec(&payload).map_err(|e| CoreError::CreateGroupFailed(e.into()))
}

pub fn decode_chain_infos(bytes: &[u8]) -> Result<(BTreeSet<String>, BTreeSet<String>), CoreError> {
    let payload: ChainInfos =
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::CreateGroupFailed(e.into()))?;
    Ok((
        payload.group_list.into_iter().collect(),
        payload.service_list.into_iter().collect(),
    ))
}

pub fn encode_deploy_info(deploy_info: &BTreeMap<String, String>) -> Result<Vec<u8>, CoreError> {
    rmp_serde::to_vec(deploy_info).map_err(|e| CoreError::ExpandGroupNodeFailed(e.into()))
}

pub fn decode_deploy_info(bytes: &[u8]) -> Result<BTreeMap<String, String>, CoreError> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::ExpandGroupNodeFailed(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_infos_round_trips() {
        let groups: BTreeSet<String> = ["g1", "g2"].into_iter().map(String::from).collect();
        let services: BTreeSet<String> = ["rpc1"].into_iter().map(String::from).collect();
        let bytes = encode_chain_infos(&groups, &services).unwrap();
        let (decoded_groups, decoded_services) = decode_chain_infos(&bytes).unwrap();
        assert_eq!(decoded_groups, groups);
        assert_eq!(decoded_services, services);
    }

    #[test]
    fn deploy_info_round_trips() {
        let mut deploy_info = BTreeMap::new();
        deploy_info.insert("rpc".to_string(), "10.0.0.1".to_string());
        deploy_info.insert("p2p".to_string(), "10.0.0.2".to_string());
        let bytes = encode_deploy_info(&deploy_info).unwrap();
        let decoded = decode_deploy_info(&bytes).unwrap();
        assert_eq!(decoded, deploy_info);
    }

    #[test]
    fn empty_collections_round_trip() {
        let bytes = encode_chain_infos(&BTreeSet::new(), &BTreeSet::new()).unwrap();
        let (groups, services) = decode_chain_infos(&bytes).unwrap();
        assert!(groups.is_empty() && services.is_empty());
    }
}
