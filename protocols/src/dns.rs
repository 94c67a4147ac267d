//! Reverse (PTR) DNS queries over plain UDP.

use std::net::IpAddr;

use anyhow::{Context, ensure};
use dns_parser::{Packet, RData, ResponseCode};
use pnet::packet::dns::{MutableDnsPacket, Opcode, Retcode};

use netsweep_common::utils::ip;

pub const DNS_HDR_LEN: usize = 12;
pub const DNS_PORT: u16 = 53;

const QTYPE_PTR: u16 = 12;
const QCLASS_IN: u16 = 1;
const MAX_LABEL_LEN: usize = 63;

/// Builds a recursive PTR query for `ip_addr` carrying transaction `id`.
pub fn create_ptr_packet(ip_addr: &IpAddr, id: u16) -> anyhow::Result<Vec<u8>> {
    let qname: Vec<u8> = encode_dns_name(&ip::reverse_address_to_ptr(ip_addr))?;
    let total: usize = DNS_HDR_LEN + qname.len() + 4;
    let mut buffer: Vec<u8> = vec![0u8; total];

    {
        let mut dns: MutableDnsPacket =
            MutableDnsPacket::new(&mut buffer).context("creating dns header")?;
        dns.set_id(id);
        dns.set_is_response(0);
        dns.set_opcode(Opcode::StandardQuery);
        dns.set_is_recursion_desirable(1);
        dns.set_rcode(Retcode::NoError);
        dns.set_query_count(1);
    }

    let mut cursor: usize = DNS_HDR_LEN;
    buffer[cursor..cursor + qname.len()].copy_from_slice(&qname);
    cursor += qname.len();
    buffer[cursor..cursor + 2].copy_from_slice(&QTYPE_PTR.to_be_bytes());
    cursor += 2;
    buffer[cursor..cursor + 2].copy_from_slice(&QCLASS_IN.to_be_bytes());

    Ok(buffer)
}

/// Extracts the transaction id and the first PTR target from a response.
pub fn get_hostname(payload: &[u8]) -> anyhow::Result<(u16, String)> {
    let packet = Packet::parse(payload).context("failed to parse DNS response")?;
    ensure!(!packet.header.query, "packet is a query, not a response");
    ensure!(
        packet.header.response_code == ResponseCode::NoError,
        "server answered {:?}",
        packet.header.response_code
    );

    let hostname: String = packet
        .answers
        .iter()
        .find_map(|record| match &record.data {
            RData::PTR(ptr) => Some(ptr.0.to_string()),
            _ => None,
        })
        .map(|name| name.trim_end_matches('.').to_string())
        .filter(|name| !name.is_empty())
        .context("no PTR record in response")?;

    Ok((packet.header.id, hostname))
}

fn encode_dns_name(name: &str) -> anyhow::Result<Vec<u8>> {
    let mut encoded: Vec<u8> = Vec::with_capacity(name.len() + 2);
    for label in name.split('.').filter(|label| !label.is_empty()) {
        ensure!(label.len() <= MAX_LABEL_LEN, "label too long: {label}");
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    Ok(encoded)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
